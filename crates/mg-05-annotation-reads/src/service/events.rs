use crate::service::ReadService;
use shared_bus::{GraphEvent, Subscription};
use shared_types::{Annotation, Node, SoulKind};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

impl ReadService {
    fn track(&self, node: &Node) {
        if !matches!(node.soul.kind(), SoulKind::Annotation { .. }) {
            return;
        }
        match Annotation::from_fields(&node.fields) {
            Ok(annotation) if !annotation.is_deleted => self.recent.record(annotation),
            _ => {
                self.recent.remove(node.soul.last_segment());
            }
        }
    }

    /// Keep the recent-annotations cache in step with annotation updates.
    pub async fn run_recent_feed(
        self: Arc<Self>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(GraphEvent::NodeUpdated { node, .. }) => self.track(&node),
                    Some(_) => {}
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        info!("[mg-05] Recent feed stopped");
    }
}
