//! Bus to Prometheus bridge.

use marginalia_telemetry::{metric_inc, WRITES_ACCEPTED, WRITES_REJECTED};
use shared_bus::{GraphEvent, Subscription};
use shared_types::WriteOrigin;
use tokio::sync::watch;
use tracing::{debug, info};

fn origin_label(origin: WriteOrigin) -> &'static str {
    match origin {
        WriteOrigin::Local => "local",
        WriteOrigin::Gossip => "gossip",
        WriteOrigin::Sync => "sync",
        WriteOrigin::Internal => "internal",
    }
}

/// Counts accepted and rejected writes as they cross the bus.
pub struct MetricsHandler;

impl MetricsHandler {
    /// Update counters for one event.
    pub fn record(event: &GraphEvent) {
        match event {
            GraphEvent::NodeUpdated { origin, .. } => {
                metric_inc!(WRITES_ACCEPTED, &[origin_label(*origin)]);
            }
            GraphEvent::WriteRejected {
                soul, code, actor, ..
            } => {
                metric_inc!(WRITES_REJECTED, &[code.as_str()]);
                debug!(%soul, code = %code, actor = ?actor, "[mg-04] Write rejected");
            }
            GraphEvent::PeerContacted { .. } | GraphEvent::PeerPruned { .. } => {}
        }
    }

    /// Consume `subscription` until the bus closes or shutdown is signalled.
    pub async fn run(mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => Self::record(&event),
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        info!("[runtime] Metrics listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, EventPublisher, EventTopic, InMemoryEventBus};
    use shared_types::{GraphPut, Node, Soul};

    fn accepted(origin: &str) -> f64 {
        WRITES_ACCEPTED.with_label_values(&[origin]).get()
    }

    fn rejected(code: &str) -> f64 {
        WRITES_REJECTED.with_label_values(&[code]).get()
    }

    #[test]
    fn test_record_counts_by_origin_and_code() {
        let gossip_before = accepted("gossip");
        let code_before = rejected("metrics-test-code");

        MetricsHandler::record(&GraphEvent::NodeUpdated {
            node: Node::new(Soul::new("misc/a")),
            diff: GraphPut::field(Soul::new("misc/a"), "k", "v"),
            origin: WriteOrigin::Gossip,
        });
        MetricsHandler::record(&GraphEvent::WriteRejected {
            soul: Soul::new("misc/a"),
            reason: "nope".into(),
            code: "metrics-test-code".into(),
            actor: None,
            origin: WriteOrigin::Local,
        });
        MetricsHandler::record(&GraphEvent::PeerContacted {
            url: "https://peer.example/graph".into(),
        });

        assert_eq!(accepted("gossip") - gossip_before, 1.0);
        assert_eq!(rejected("metrics-test-code") - code_before, 1.0);
    }

    #[tokio::test]
    async fn test_listener_stops_on_shutdown() {
        let bus = InMemoryEventBus::new();
        let subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::Graph, EventTopic::Security]));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(MetricsHandler::run(subscription, rx));

        let before = rejected("listener-test-code");
        bus.publish(GraphEvent::WriteRejected {
            soul: Soul::new("misc/b"),
            reason: "nope".into(),
            code: "listener-test-code".into(),
            actor: None,
            origin: WriteOrigin::Gossip,
        })
        .await;

        for _ in 0..50 {
            if rejected("listener-test-code") > before {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(rejected("listener-test-code") - before, 1.0);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
