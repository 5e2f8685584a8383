//! # Test Harness
//!
//! A [`TestNode`] is one complete node container (graph store, validator,
//! directory, replicator, read path, deletion) on a [`ManualTimeSource`],
//! optionally attached to a shared [`LoopbackNetwork`].

use mg_02_graph_store::{GraphApi, PutOutcome};
use mg_03_shard_router::ShardingApi;
use mg_04_write_validator::{sign_annotation, sign_comment};
use mg_05_annotation_reads::{AnnotationReadApi, ReadError, ReadResponse};
use mg_07_replication::{LoopbackNetwork, ReplicationApi};
use node_runtime::{NodeConfig, SubsystemContainer};
use shared_bus::{EventFilter, EventTopic};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    Annotation, Comment, GraphPut, ManualTimeSource, Soul, TimeSource, Timestamp, WriteOrigin,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Start of every test clock.
pub const NOW: Timestamp = 1_700_000_000_000;

pub struct TestNode {
    pub url: Option<String>,
    pub time: Arc<ManualTimeSource>,
    pub network: Arc<LoopbackNetwork>,
    pub container: SubsystemContainer,
}

impl TestNode {
    /// A node with no peers and no public URL.
    pub fn standalone() -> Self {
        Self::build(NodeConfig::default(), LoopbackNetwork::new(), None)
    }

    /// A standalone node with the given admin DIDs.
    pub fn with_admins(admins: Vec<String>) -> Self {
        let mut config = NodeConfig::default();
        config.validation.admins = admins;
        Self::build(config, LoopbackNetwork::new(), None)
    }

    /// A node reachable at `url` on `network`.
    pub fn on_network(network: &Arc<LoopbackNetwork>, url: &str) -> Self {
        Self::build(NodeConfig::default(), network.clone(), Some(url.to_string()))
    }

    fn build(mut config: NodeConfig, network: Arc<LoopbackNetwork>, url: Option<String>) -> Self {
        config.storage.in_memory = true;
        config.network.public_url = url.clone();
        config.reads.profile_backoff_ms = 1;
        let time = Arc::new(ManualTimeSource::new(NOW));
        let container = SubsystemContainer::with_parts(config, time.clone(), network.clone())
            .expect("container builds");
        if let Some(url) = &url {
            let replication: Arc<dyn ReplicationApi> = container.replicator.clone();
            network.attach(url, &replication, container.graph.clone());
        }
        Self {
            url,
            time,
            network,
            container,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.time.now_ms()
    }

    pub async fn put(&self, put: GraphPut) -> PutOutcome {
        self.container
            .graph
            .put(put, WriteOrigin::Local)
            .await
            .expect("graph store available")
    }

    pub fn get(&self, soul: &Soul) -> Option<shared_types::Node> {
        self.container.graph.get(soul).expect("graph store available")
    }

    /// Where new annotations on `page` are written.
    pub fn location(&self, page: &str) -> Soul {
        self.container.router.placement(page).primary_location()
    }

    /// A signed annotation put on `page`, stamped with the node clock.
    pub fn annotation_put(
        &self,
        author: &Ed25519KeyPair,
        page: &str,
        id: &str,
        content: &str,
    ) -> GraphPut {
        let mut annotation = Annotation {
            id: id.into(),
            url: page.into(),
            content: content.into(),
            author: String::new(),
            timestamp: self.now(),
            is_deleted: false,
            screenshot: None,
            signature: String::new(),
            nonce: format!("nonce-{id}"),
            metadata: None,
        };
        sign_annotation(author, &mut annotation);
        GraphPut::fields(Soul::annotation(&self.location(page), id), annotation.to_fields())
    }

    pub fn comment_put(
        &self,
        author: &Ed25519KeyPair,
        annotation: &Soul,
        id: &str,
        content: &str,
    ) -> GraphPut {
        let mut comment = Comment {
            id: id.into(),
            annotation_id: annotation.last_segment().to_string(),
            content: content.into(),
            author: String::new(),
            timestamp: self.now(),
            is_deleted: false,
            signature: String::new(),
            nonce: format!("nonce-{id}"),
        };
        sign_comment(author, &mut comment);
        GraphPut::fields(Soul::comment(annotation, id), comment.to_fields())
    }

    /// Publish an annotation and return its soul. Panics unless applied.
    pub async fn publish(
        &self,
        author: &Ed25519KeyPair,
        page: &str,
        id: &str,
        content: &str,
    ) -> Soul {
        let put = self.annotation_put(author, page, id, content);
        let soul = put.soul.clone();
        let outcome = self.put(put).await;
        assert!(outcome.is_applied(), "publish {id}: {outcome:?}");
        soul
    }

    pub async fn read(&self, page: &str) -> Result<ReadResponse, ReadError> {
        self.container.reads.read_annotations(page).await
    }

    pub async fn read_one(&self, page: &str, id: &str) -> Result<ReadResponse, ReadError> {
        self.container.reads.read_annotation(page, id).await
    }

    /// Make `other` a live peer of this node.
    pub async fn connect(&self, other: &TestNode) {
        use mg_01_peer_directory::PeerDirectoryApi;
        let url = other.url.as_deref().expect("peer has a public URL");
        self.container
            .directory
            .on_peer_connect(url)
            .await
            .expect("peer url accepted");
    }

    /// Run this node's relay loop until the returned sender flips.
    pub fn spawn_relay(&self) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(false);
        let subscription = self
            .container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Graph]));
        let handle = tokio::spawn(self.container.replicator.clone().run_relay_loop(subscription, rx));
        (tx, handle)
    }
}

/// Poll `check` for up to one second.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Deterministic test identities.
pub fn alice() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([1; 32])
}

pub fn bob() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([2; 32])
}

pub fn admin() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([3; 32])
}
