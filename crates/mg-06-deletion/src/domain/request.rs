//! # Deletion Request
//!
//! A soft delete is two puts, applied in order:
//!
//! 1. the signed [`DeletionRecord`] at `deletions/<target>`
//! 2. `{isDeleted: true, deletedBy: <did>}` on the target
//!
//! Replicas refuse the second put until they hold the first.

use mg_04_write_validator::sign_deletion;
use serde::Serialize;
use shared_crypto::Ed25519KeyPair;
use shared_types::{fields, DeletionRecord, FieldMap, GraphPut, Soul, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub target: Soul,
    pub record: DeletionRecord,
}

impl DeletionRequest {
    /// Sign a deletion of `target` at `now`.
    pub fn sign(keypair: &Ed25519KeyPair, target: Soul, now: Timestamp, nonce: &str) -> Self {
        let record = sign_deletion(keypair, &target, now, nonce);
        Self { target, record }
    }

    pub fn record_soul(&self) -> Soul {
        Soul::deletion_record(&self.target)
    }

    pub fn record_put(&self) -> GraphPut {
        GraphPut::fields(self.record_soul(), self.record.to_fields())
    }

    /// The flag write. Leaves `author` and content alone.
    pub fn flag_put(&self) -> GraphPut {
        let mut data = FieldMap::new();
        data.insert(fields::IS_DELETED.into(), true.into());
        data.insert(fields::DELETED_BY.into(), self.record.author.clone().into());
        GraphPut::fields(self.target.clone(), data)
    }

    /// Both puts, record first.
    pub fn puts(&self) -> [GraphPut; 2] {
        [self.record_put(), self.flag_put()]
    }
}

/// Result of a soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReceipt {
    pub target: Soul,
    pub deleted_by: String,
    /// False when the target was already soft-deleted.
    pub newly_deleted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcReport {
    /// Another sweep held the throttle.
    pub skipped: bool,
    pub examined: usize,
    pub tombstoned: usize,
}

impl GcReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_precedes_flag() {
        let keypair = Ed25519KeyPair::from_seed([9; 32]);
        let target = Soul::new("annotations_example_com/u/a1");
        let request = DeletionRequest::sign(&keypair, target.clone(), 1_000, "n");

        let [record, flag] = request.puts();
        assert_eq!(record.soul, Soul::deletion_record(&target));
        assert_eq!(record.text(fields::AUTHOR), Some(keypair.did().as_str()));
        assert_eq!(flag.soul, target);
        assert_eq!(flag.value(fields::IS_DELETED), Some(&true.into()));
        assert_eq!(flag.text(fields::DELETED_BY), Some(keypair.did().as_str()));
        assert!(flag.value(fields::AUTHOR).is_none());
    }
}
