//! # Multi-Node Replication
//!
//! Several full nodes on one [`LoopbackNetwork`]: live relay, catch-up on
//! read, deletion propagation and partitions.
//!
//! [`LoopbackNetwork`]: mg_07_replication::LoopbackNetwork

#[cfg(test)]
mod tests {
    use crate::harness::{alice, eventually, TestNode};
    use mg_02_graph_store::PutOutcome;
    use mg_05_annotation_reads::ReadError;
    use mg_06_deletion::{DeletionApi, Lifecycle};
    use mg_07_replication::{Delivery, GraphMessage, LoopbackNetwork, ReplicationApi};
    use shared_types::{fields, Soul};

    const PAGE: &str = "https://example.com/page?utm_source=x";
    const A_URL: &str = "https://a.test/graph";
    const B_URL: &str = "https://b.test/graph";
    const C_URL: &str = "https://c.test/graph";

    fn pair() -> (TestNode, TestNode) {
        let network = LoopbackNetwork::new();
        (
            TestNode::on_network(&network, A_URL),
            TestNode::on_network(&network, B_URL),
        )
    }

    #[tokio::test]
    async fn test_live_relay_reaches_peer() {
        let (a, b) = pair();
        a.connect(&b).await;
        let (stop, relay) = a.spawn_relay();

        let soul = a.publish(&alice(), PAGE, "a1", "hello").await;
        assert!(eventually(|| b.get(&soul).is_some()).await);

        let response = b.read(PAGE).await.unwrap();
        assert_eq!(response.annotations[0].annotation.id, "a1");

        stop.send(true).unwrap();
        relay.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_pulls_missing_annotations() {
        let (a, b) = pair();
        a.publish(&alice(), PAGE, "a1", "hello").await;
        b.connect(&a).await;

        let response = b.read(PAGE).await.unwrap();
        assert_eq!(response.annotations.len(), 1);
        assert_eq!(response.annotations[0].annotation.content, "hello");
    }

    #[tokio::test]
    async fn test_deletion_propagates_by_pull() {
        let (a, b) = pair();
        let alice = alice();
        let soul = a.publish(&alice, PAGE, "a1", "hello").await;
        b.connect(&a).await;
        let location = a.location(PAGE);

        b.container.replicator.fetch_location(&location).await.unwrap();
        assert_eq!(
            b.container.deletion.lifecycle(&soul).unwrap(),
            Lifecycle::Active
        );

        a.time.advance(1_000);
        a.container.deletion.soft_delete(&alice, &soul).await.unwrap();
        b.time.advance(1_000);

        let report = b.container.replicator.fetch_location(&location).await.unwrap();
        assert!(report.nodes_applied >= 1, "{report:?}");
        assert!(matches!(
            b.container.deletion.lifecycle(&soul).unwrap(),
            Lifecycle::SoftDeleted { .. }
        ));
        assert_eq!(b.get(&soul).unwrap().text(fields::AUTHOR), Some(alice.did().as_str()));
        assert!(matches!(b.read(PAGE).await, Err(ReadError::NotFound)));
    }

    #[tokio::test]
    async fn test_partitioned_peer_catches_up() {
        let network = LoopbackNetwork::new();
        let a = TestNode::on_network(&network, A_URL);
        let b = TestNode::on_network(&network, B_URL);
        let c = TestNode::on_network(&network, C_URL);
        a.connect(&b).await;
        a.connect(&c).await;
        network.set_offline(C_URL, true);

        let put = a.annotation_put(&alice(), PAGE, "a1", "hello");
        let soul = put.soul.clone();
        assert!(a.put(put.clone()).await.is_applied());
        let report = a.container.replicator.relay(&put).await;
        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, vec![C_URL.to_string()]);
        assert!(b.get(&soul).is_some());
        assert!(c.get(&soul).is_none());

        network.set_offline(C_URL, false);
        c.connect(&b).await;
        c.container
            .replicator
            .fetch_location(&c.location(PAGE))
            .await
            .unwrap();
        assert!(c.get(&soul).is_some());
    }

    #[tokio::test]
    async fn test_forged_gossip_is_refused_by_receiver() {
        let (a, b) = pair();
        let mut put = a.annotation_put(&alice(), PAGE, "a1", "hello");
        put.data
            .as_mut()
            .unwrap()
            .insert(fields::CONTENT.into(), "tampered".into());

        let delivery = b
            .container
            .replicator
            .handle_message(GraphMessage::new(put.clone(), Some(A_URL.into())))
            .await
            .unwrap();
        assert!(matches!(
            delivery,
            Delivery::Delivered(PutOutcome::Rejected { .. })
        ));
        assert!(b.get(&put.soul).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_edits_converge() {
        let (a, b) = pair();
        let alice = alice();
        let first = a.annotation_put(&alice, PAGE, "a1", "first");
        assert!(a.put(first.clone()).await.is_applied());
        assert!(b.put(first).await.is_applied());

        a.time.advance(1_000);
        b.time.advance(2_000);
        let on_a = a.annotation_put(&alice, PAGE, "a1", "edit on a");
        let on_b = b.annotation_put(&alice, PAGE, "a1", "edit on b");
        let soul = on_a.soul.clone();
        a.put(on_a).await;
        b.put(on_b).await;

        // Exchange the full nodes both ways.
        let snapshot_a = a.get(&soul).unwrap();
        let snapshot_b = b.get(&soul).unwrap();
        b.container
            .replicator
            .handle_message(GraphMessage::new(snapshot_a.to_put(), Some(A_URL.into())))
            .await
            .unwrap();
        a.container
            .replicator
            .handle_message(GraphMessage::new(snapshot_b.to_put(), Some(B_URL.into())))
            .await
            .unwrap();

        let final_a = a.get(&soul).unwrap();
        let final_b = b.get(&soul).unwrap();
        assert_eq!(final_a.fields, final_b.fields);
        assert_eq!(final_a.text(fields::CONTENT), Some("edit on b"));
    }

    #[tokio::test]
    async fn test_delete_racing_edit_converges_deleted() {
        let (a, b) = pair();
        let alice = alice();
        let first = a.annotation_put(&alice, PAGE, "a1", "first");
        let soul = first.soul.clone();
        assert!(a.put(first.clone()).await.is_applied());
        assert!(b.put(first).await.is_applied());

        a.time.advance(1_000);
        b.time.advance(2_000);
        a.container.deletion.soft_delete(&alice, &soul).await.unwrap();
        let edit = b.annotation_put(&alice, PAGE, "a1", "edit on b");
        assert!(b.put(edit).await.is_applied());

        let record = a.get(&Soul::deletion_record(&soul)).unwrap();
        let snapshot_a = a.get(&soul).unwrap();
        let snapshot_b = b.get(&soul).unwrap();
        let from_a = |put| GraphMessage::new(put, Some(A_URL.into()));
        for message in [from_a(record.to_put()), from_a(snapshot_a.to_put())] {
            let delivery = b.container.replicator.handle_message(message).await.unwrap();
            assert!(
                matches!(delivery, Delivery::Delivered(PutOutcome::Applied { .. })),
                "{delivery:?}"
            );
        }
        let delivery = a
            .container
            .replicator
            .handle_message(GraphMessage::new(snapshot_b.to_put(), Some(B_URL.into())))
            .await
            .unwrap();
        assert!(
            matches!(delivery, Delivery::Delivered(PutOutcome::Applied { .. })),
            "{delivery:?}"
        );

        let final_a = a.get(&soul).unwrap();
        let final_b = b.get(&soul).unwrap();
        assert_eq!(final_a.fields, final_b.fields);
        assert_eq!(final_a.flag(fields::IS_DELETED), Some(true));
        assert_eq!(final_a.text(fields::CONTENT), Some("edit on b"));
        for node in [&a, &b] {
            assert!(matches!(
                node.container.deletion.lifecycle(&soul).unwrap(),
                Lifecycle::SoftDeleted { .. }
            ));
            assert!(matches!(node.read(PAGE).await, Err(ReadError::NotFound)));
        }
    }
}
