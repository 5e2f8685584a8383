//! Read path → replication bridge.
//!
//! The read path asks for catch-up pulls through its `LocationSync` port;
//! this adapter answers with replica pulls. Failures are logged and
//! swallowed: a read never fails because a peer is down.

use async_trait::async_trait;
use mg_05_annotation_reads::LocationSync;
use mg_07_replication::ReplicationApi;
use shared_types::Soul;
use std::sync::Arc;
use tracing::debug;

pub struct ReplicationSync {
    replication: Arc<dyn ReplicationApi>,
}

impl ReplicationSync {
    pub fn new(replication: Arc<dyn ReplicationApi>) -> Self {
        Self { replication }
    }
}

#[async_trait]
impl LocationSync for ReplicationSync {
    async fn sync_location(&self, location: &Soul) {
        match self.replication.fetch_location(location).await {
            Ok(report) => debug!(
                location = %location,
                peers = report.peers_queried,
                applied = report.nodes_applied,
                "[runtime] Location pulled"
            ),
            Err(e) => debug!(location = %location, error = %e, "[runtime] Location pull failed"),
        }
    }

    async fn sync_node(&self, soul: &Soul) {
        if let Err(e) = self.replication.fetch_node(soul).await {
            debug!(soul = %soul, error = %e, "[runtime] Node pull failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_07_replication::{
        BootstrapReport, Delivery, GraphMessage, PullReport, RelayReport, ReplicationError,
    };
    use shared_types::GraphPut;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReplicationApi for Recorder {
        async fn handle_message(&self, _m: GraphMessage) -> Result<Delivery, ReplicationError> {
            Ok(Delivery::Duplicate)
        }
        async fn relay(&self, _put: &GraphPut) -> RelayReport {
            RelayReport::default()
        }
        async fn fetch_location(&self, location: &Soul) -> Result<PullReport, ReplicationError> {
            self.calls.lock().unwrap().push(format!("location {location}"));
            Err(ReplicationError::NoPeers)
        }
        async fn fetch_node(&self, soul: &Soul) -> Result<PullReport, ReplicationError> {
            self.calls.lock().unwrap().push(format!("node {soul}"));
            Ok(PullReport::default())
        }
        async fn bootstrap(&self) -> BootstrapReport {
            BootstrapReport::default()
        }
    }

    #[tokio::test]
    async fn test_pulls_are_forwarded_and_errors_swallowed() {
        let recorder = Arc::new(Recorder::default());
        let sync = ReplicationSync::new(recorder.clone());

        sync.sync_location(&Soul::new("annotations_example_com/x")).await;
        sync.sync_node(&Soul::new("profiles/did")).await;

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "location annotations_example_com/x".to_string(),
                "node profiles/did".to_string()
            ]
        );
    }
}
