//! Command-line flags. Each flag also reads an `MG_*` environment variable,
//! and both override the config file.

use crate::container::{ConfigError, NodeConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Marginalia node: stores, validates and replicates web annotations.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "marginalia-node", version)]
#[command(about = "Decentralized web-annotation node")]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, env = "MG_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP listen address
    #[arg(short, long, env = "MG_LISTEN_ADDR")]
    pub listen: Option<SocketAddr>,

    /// Graph endpoint peers reach this node at, e.g. https://node.example/graph
    #[arg(long, env = "MG_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Seed peer graph endpoint (repeatable, or comma separated in MG_SEED_PEERS)
    #[arg(short, long = "peer", env = "MG_SEED_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Directory holding the graph file
    #[arg(long, env = "MG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep the graph in memory only
    #[arg(long, env = "MG_IN_MEMORY")]
    pub in_memory: bool,

    /// Admin DID allowed to delete any content (repeatable)
    #[arg(long = "admin", env = "MG_ADMINS", value_delimiter = ',')]
    pub admins: Vec<String>,

    /// Log level filter, e.g. `info` or `mg_07_replication=debug`
    #[arg(long, env = "MG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, env = "MG_JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    /// Build the node configuration: file first, then flags, then validation.
    pub fn load_config(&self) -> Result<NodeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => NodeConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut NodeConfig) {
        if let Some(addr) = self.listen {
            config.network.listen_addr = addr;
        }
        if let Some(url) = &self.public_url {
            config.network.public_url = Some(url.trim().to_string());
        }
        if !self.peers.is_empty() {
            config.network.seed_peers = trimmed(&self.peers);
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if self.in_memory {
            config.storage.in_memory = true;
        }
        if !self.admins.is_empty() {
            config.validation.admins = trimmed(&self.admins);
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
