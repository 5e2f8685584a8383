//! In-process network. Each attached node is reachable under its URL; a
//! node can be taken offline to simulate partitions.

use crate::domain::{GraphMessage, ReplicationError};
use crate::ports::{PeerTransport, ReplicationApi};
use async_trait::async_trait;
use mg_02_graph_store::GraphApi;
use parking_lot::RwLock;
use shared_types::{Node, Soul};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

#[derive(Clone)]
struct LoopbackPeer {
    replication: Weak<dyn ReplicationApi>,
    graph: Arc<dyn GraphApi>,
}

#[derive(Default)]
pub struct LoopbackNetwork {
    peers: RwLock<HashMap<String, LoopbackPeer>>,
    offline: RwLock<HashSet<String>>,
}

impl LoopbackNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attach(
        &self,
        url: &str,
        replication: &Arc<dyn ReplicationApi>,
        graph: Arc<dyn GraphApi>,
    ) {
        self.peers.write().insert(
            url.to_string(),
            LoopbackPeer {
                replication: Arc::downgrade(replication),
                graph,
            },
        );
    }

    pub fn set_offline(&self, url: &str, offline: bool) {
        let mut set = self.offline.write();
        if offline {
            set.insert(url.to_string());
        } else {
            set.remove(url);
        }
    }

    fn peer(&self, url: &str) -> Result<LoopbackPeer, ReplicationError> {
        let unreachable = || ReplicationError::Transport {
            peer: url.to_string(),
            message: "unreachable".into(),
        };
        if self.offline.read().contains(url) {
            return Err(unreachable());
        }
        self.peers.read().get(url).cloned().ok_or_else(unreachable)
    }
}

#[async_trait]
impl PeerTransport for LoopbackNetwork {
    async fn send(&self, peer_url: &str, message: &GraphMessage) -> Result<(), ReplicationError> {
        let replication = self
            .peer(peer_url)?
            .replication
            .upgrade()
            .ok_or_else(|| ReplicationError::Transport {
                peer: peer_url.to_string(),
                message: "node stopped".into(),
            })?;
        replication.handle_message(message.clone()).await.map(|_| ())
    }

    async fn fetch_children(
        &self,
        peer_url: &str,
        parent: &Soul,
    ) -> Result<Vec<Node>, ReplicationError> {
        Ok(self.peer(peer_url)?.graph.children(parent)?)
    }

    async fn fetch_node(
        &self,
        peer_url: &str,
        soul: &Soul,
    ) -> Result<Option<Node>, ReplicationError> {
        Ok(self.peer(peer_url)?.graph.get(soul)?)
    }
}
