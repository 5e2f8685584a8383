//! # Append-Log Key-Value Store
//!
//! The map lives in memory; every mutation appends one frame to the log:
//!
//! ```text
//! [len: u32 LE][bincode(Vec<LogOp>)]
//! ```
//!
//! One frame per put, delete or batch, so a batch is replayed whole or not at
//! all. Opening replays the frames in order. A short final frame is the tail
//! of an interrupted append and is cut off; any other undecodable frame makes
//! `open` fail rather than start from a partial graph.
//!
//! Once the log holds many more frames than live keys it is compacted: the
//! live map is written as a single frame to a temp file, synced, and renamed
//! over the log.

use super::memory::scan;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LEN_BYTES: usize = 4;

/// Frames appended before compaction is considered at all.
pub const MIN_COMPACT_FRAMES: usize = 1024;

#[derive(Debug, Serialize, Deserialize)]
enum LogOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl From<BatchOperation> for LogOp {
    fn from(op: BatchOperation) -> Self {
        match op {
            BatchOperation::Put { key, value } => LogOp::Put { key, value },
            BatchOperation::Delete { key } => LogOp::Delete { key },
        }
    }
}

fn apply_ops(data: &mut BTreeMap<Vec<u8>, Vec<u8>>, ops: Vec<LogOp>) {
    for op in ops {
        match op {
            LogOp::Put { key, value } => {
                data.insert(key, value);
            }
            LogOp::Delete { key } => {
                data.remove(&key);
            }
        }
    }
}

fn encode_frame(ops: &[LogOp]) -> Result<Vec<u8>, KVStoreError> {
    let payload = bincode::serialize(ops).map_err(|e| KVStoreError::Backend {
        message: e.to_string(),
    })?;
    let len = u32::try_from(payload.len()).map_err(|_| KVStoreError::Backend {
        message: format!("frame of {} bytes too large", payload.len()),
    })?;
    let mut frame = Vec::with_capacity(LEN_BYTES + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Result of replaying a log.
struct Replay {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    frames: usize,
    /// Length of the valid prefix; anything after it is a torn tail.
    valid_len: u64,
}

fn replay(bytes: &[u8]) -> Result<Replay, KVStoreError> {
    let mut data = BTreeMap::new();
    let mut frames = 0;
    let mut offset = 0;
    while offset < bytes.len() {
        let Some(header) = bytes.get(offset..offset + LEN_BYTES) else {
            break;
        };
        let mut len = [0u8; LEN_BYTES];
        len.copy_from_slice(header);
        let start = offset + LEN_BYTES;
        let end = start + u32::from_le_bytes(len) as usize;
        let Some(payload) = bytes.get(start..end) else {
            break;
        };
        let ops: Vec<LogOp> =
            bincode::deserialize(payload).map_err(|e| KVStoreError::Corrupt {
                offset: offset as u64,
                message: e.to_string(),
            })?;
        apply_ops(&mut data, ops);
        frames += 1;
        offset = end;
    }
    Ok(Replay {
        data,
        frames,
        valid_len: offset as u64,
    })
}

/// File-backed key-value store with an append-only log.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    log: File,
    frames: usize,
}

impl FileBackedKVStore {
    /// Open (or create) the log at `path` and replay it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(io_error(e)),
        };
        let replay = replay(&bytes)?;

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        if replay.valid_len < bytes.len() as u64 {
            warn!(
                path = %path.display(),
                dropped = bytes.len() as u64 - replay.valid_len,
                "[mg-02] Truncating torn tail of graph log"
            );
            log.set_len(replay.valid_len).map_err(io_error)?;
        }

        if replay.frames == 0 {
            info!("[mg-02] 📁 New graph log at {}", path.display());
        } else {
            info!(
                "[mg-02] 💾 Replayed {} frames ({} keys) from {}",
                replay.frames,
                replay.data.len(),
                path.display()
            );
        }

        let mut store = Self {
            data: replay.data,
            path,
            log,
            frames: replay.frames,
        };
        store.maybe_compact()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames currently in the log.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Write one frame. The caller applies the ops to the map afterwards and
    /// then calls `maybe_compact`.
    fn append(&mut self, ops: &[LogOp]) -> Result<(), KVStoreError> {
        let frame = encode_frame(ops)?;
        self.log.write_all(&frame).map_err(io_error)?;
        self.frames += 1;
        Ok(())
    }

    fn maybe_compact(&mut self) -> Result<(), KVStoreError> {
        if self.frames < MIN_COMPACT_FRAMES.max(self.data.len() * 2) {
            return Ok(());
        }
        self.compact()
    }

    /// Rewrite the log as one frame holding the live map.
    pub fn compact(&mut self) -> Result<(), KVStoreError> {
        let ops: Vec<LogOp> = self
            .data
            .iter()
            .map(|(key, value)| LogOp::Put {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        let frame = encode_frame(&ops)?;

        let temp_path = self.path.with_extension("tmp");
        let mut temp = File::create(&temp_path).map_err(io_error)?;
        temp.write_all(&frame).map_err(io_error)?;
        temp.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        self.log = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;
        debug!(
            from = self.frames,
            keys = self.data.len(),
            "[mg-02] Graph log compacted"
        );
        self.frames = 1;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let op = LogOp::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        };
        self.append(std::slice::from_ref(&op))?;
        apply_ops(&mut self.data, vec![op]);
        self.maybe_compact()
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.append(&[LogOp::Delete { key: key.to_vec() }])?;
        self.data.remove(key);
        self.maybe_compact()
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let ops: Vec<LogOp> = operations.into_iter().map(LogOp::from).collect();
        self.append(&ops)?;
        apply_ops(&mut self.data, ops);
        self.maybe_compact()
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}
