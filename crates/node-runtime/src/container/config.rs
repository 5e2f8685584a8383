//! # Node Configuration
//!
//! One TOML document with a table per subsystem. Every table and every key
//! is optional; missing values take the subsystem defaults.
//!
//! ```toml
//! [network]
//! listen_addr = "0.0.0.0:8765"
//! public_url = "https://node.example/graph"
//! seed_peers = ["https://seed.example/graph"]
//!
//! [storage]
//! data_dir = "./data"
//!
//! [validation]
//! admins = ["did:key:z6Mk..."]
//! ```
//!
//! Precedence, lowest first: defaults, the file, `MG_*` environment
//! variables and command-line flags (see [`crate::cli`]).

use mg_01_peer_directory::DirectoryConfig;
use mg_02_graph_store::GraphStoreConfig;
use mg_03_shard_router::ShardConfig;
use mg_04_write_validator::ValidationConfig;
use mg_05_annotation_reads::ReadPathConfig;
use mg_06_deletion::DeletionConfig;
use mg_07_replication::ReplicationConfig;
use mg_08_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the graph log inside the data directory.
pub const GRAPH_FILE: &str = "graph.log";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub graph: GraphStoreConfig,
    pub validation: ValidationConfig,
    pub shards: ShardConfig,
    pub directory: DirectoryConfig,
    pub reads: ReadPathConfig,
    pub deletion: DeletionConfig,
    pub replication: ReplicationConfig,
    pub gateway: GatewayConfig,
}

/// Where this node listens and who it talks to first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub listen_addr: SocketAddr,
    /// Graph endpoint other peers reach us at. Without one the node still
    /// serves reads and relays, but never registers in the directory.
    pub public_url: Option<String>,
    pub seed_peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: GatewayConfig::default().listen_addr,
            public_url: None,
            seed_peers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Keep the graph in memory only.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            in_memory: false,
        }
    }
}

impl StorageConfig {
    pub fn graph_file(&self) -> PathBuf {
        self.data_dir.join(GRAPH_FILE)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl NodeConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Check what the subsystems would only catch later, or not at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let suffix = &self.directory.url_suffix;
        let urls = self
            .network
            .public_url
            .iter()
            .chain(self.network.seed_peers.iter());
        for url in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{url} is not an http(s) URL")));
            }
            if !url.ends_with(suffix.as_str()) {
                return Err(ConfigError::Invalid(format!("{url} does not end with {suffix}")));
            }
        }
        if self.shards.sub_shard_count == 0 {
            return Err(ConfigError::Invalid("shards.sub_shard_count must be > 0".into()));
        }
        if self.replication.fanout == 0 {
            return Err(ConfigError::Invalid("replication.fanout must be > 0".into()));
        }
        if let Some(admin) = self.validation.admins.iter().find(|d| !d.starts_with("did:key:")) {
            return Err(ConfigError::Invalid(format!("admin {admin} is not a did:key")));
        }
        Ok(())
    }

    /// Directory settings with the network identity filled in.
    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            public_url: self.network.public_url.clone(),
            ..self.directory.clone()
        }
    }

    pub fn replication_config(&self) -> ReplicationConfig {
        ReplicationConfig {
            public_url: self.network.public_url.clone(),
            seed_peers: self.network.seed_peers.clone(),
            ..self.replication.clone()
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            listen_addr: self.network.listen_addr,
            ..self.gateway.clone()
        }
    }
}
