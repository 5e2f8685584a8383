//! # Convergence Properties
//!
//! - **Idempotence**: applying the same write again changes nothing.
//! - **Monotonic deletion**: once soft-deleted, content never reads as live
//!   again, whatever arrives later.
//! - **Shard determinism**: every node places a URL, with or without
//!   tracking parameters, in the same shards.

#[cfg(test)]
mod tests {
    use crate::harness::{alice, TestNode};
    use mg_02_graph_store::{GraphApi, PutOutcome};
    use mg_03_shard_router::{ShardConfig, ShardRouter, ShardingApi};
    use mg_05_annotation_reads::ReadError;
    use mg_06_deletion::{DeletionApi, Lifecycle};
    use mg_07_replication::{Delivery, GraphMessage, ReplicationApi};
    use shared_types::{fields, GraphPut, WriteOrigin};

    const PAGE: &str = "https://example.com/page?utm_source=x";

    // =========================================================================
    // IDEMPOTENCE
    // =========================================================================

    #[tokio::test]
    async fn test_repeated_put_is_unchanged() {
        let node = TestNode::standalone();
        let put = node.annotation_put(&alice(), PAGE, "a1", "hello");

        assert!(node.put(put.clone()).await.is_applied());
        let before = node.get(&put.soul).unwrap();

        let again = node.put(put.clone()).await;
        assert!(matches!(again, PutOutcome::Unchanged { .. }), "{again:?}");
        assert_eq!(node.get(&put.soul).unwrap(), before);
    }

    #[tokio::test]
    async fn test_replayed_snapshot_is_unchanged() {
        let node = TestNode::standalone();
        let soul = node.publish(&alice(), PAGE, "a1", "hello").await;
        let snapshot = node.get(&soul).unwrap();

        let outcome = node
            .container
            .graph
            .put(snapshot.to_put(), WriteOrigin::Sync)
            .await
            .unwrap();
        assert!(matches!(outcome, PutOutcome::Unchanged { .. }), "{outcome:?}");
        assert_eq!(node.get(&soul).unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_gossip_message_delivered_once() {
        let node = TestNode::standalone();
        let put = node.annotation_put(&alice(), PAGE, "a1", "hello");
        let message = GraphMessage::new(put, None);

        let first = node.container.replicator.handle_message(message.clone()).await.unwrap();
        assert!(matches!(first, Delivery::Delivered(PutOutcome::Applied { .. })));
        let second = node.container.replicator.handle_message(message).await.unwrap();
        assert!(matches!(second, Delivery::Duplicate));
    }

    // =========================================================================
    // MONOTONIC DELETION
    // =========================================================================

    #[tokio::test]
    async fn test_soft_delete_cannot_be_reverted() {
        let node = TestNode::standalone();
        let alice = alice();
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;
        let before_delete = node.get(&soul).unwrap();

        node.time.advance(1_000);
        let receipt = node.container.deletion.soft_delete(&alice, &soul).await.unwrap();
        assert!(receipt.newly_deleted);

        // Explicit revival by the owner.
        node.time.advance(1_000);
        let mut revive = GraphPut::field(soul.clone(), fields::IS_DELETED, false);
        revive
            .data
            .get_or_insert_with(Default::default)
            .insert(fields::AUTHOR.into(), alice.did().into());
        assert!(node.put(revive).await.is_rejected());

        // Full re-publish carries isDeleted = false. The content merges, the
        // flag does not move.
        let republish = node.annotation_put(&alice, PAGE, "a1", "hello again");
        assert!(node.put(republish).await.is_applied());
        let stored = node.get(&soul).unwrap();
        assert_eq!(stored.flag(fields::IS_DELETED), Some(true));
        assert_eq!(stored.text(fields::CONTENT), Some("hello again"));

        // Old pre-deletion snapshot arriving from a peer.
        let replay = node
            .container
            .graph
            .put(before_delete.to_put(), WriteOrigin::Sync)
            .await
            .unwrap();
        assert!(!replay.is_applied(), "{replay:?}");

        assert!(matches!(
            node.container.deletion.lifecycle(&soul).unwrap(),
            Lifecycle::SoftDeleted { .. }
        ));
        assert!(matches!(node.read(PAGE).await, Err(ReadError::NotFound)));
    }

    #[tokio::test]
    async fn test_edit_without_flag_keeps_deletion() {
        let node = TestNode::standalone();
        let alice = alice();
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;
        node.time.advance(1_000);
        node.container.deletion.soft_delete(&alice, &soul).await.unwrap();

        node.time.advance(1_000);
        let mut edit = node.annotation_put(&alice, PAGE, "a1", "edited");
        edit.data.as_mut().unwrap().remove(fields::IS_DELETED);
        assert!(node.put(edit).await.is_applied());

        let stored = node.get(&soul).unwrap();
        assert_eq!(stored.text(fields::CONTENT), Some("edited"));
        assert_eq!(stored.flag(fields::IS_DELETED), Some(true));
        assert!(matches!(node.read(PAGE).await, Err(ReadError::NotFound)));
    }

    #[tokio::test]
    async fn test_gc_moves_deleted_content_to_tombstone() {
        let node = TestNode::standalone();
        let alice = alice();
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;
        let live = node.publish(&alice, PAGE, "a2", "still here").await;
        node.container.deletion.soft_delete(&alice, &soul).await.unwrap();

        node.time
            .advance(node.container.config.deletion.tombstone_after_ms + 1);
        let report = node.container.deletion.collect_garbage().await.unwrap();
        assert_eq!(report.tombstoned, 1);

        assert_eq!(
            node.container.deletion.lifecycle(&soul).unwrap(),
            Lifecycle::Tombstoned
        );
        assert_eq!(
            node.container.deletion.lifecycle(&live).unwrap(),
            Lifecycle::Active
        );

        let response = node.read(PAGE).await.unwrap();
        let ids: Vec<_> = response
            .annotations
            .iter()
            .map(|view| view.annotation.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a2"]);
    }

    // =========================================================================
    // SHARD DETERMINISM
    // =========================================================================

    #[test]
    fn test_tracking_parameters_do_not_change_placement() {
        let router = ShardRouter::default();
        let clean = router.placement("https://example.com/page");
        for variant in [
            "https://example.com/page?utm_source=x",
            "https://example.com/page/?utm_medium=y&utm_campaign=z",
            "  https://https://Example.com/page/  ",
        ] {
            assert_eq!(router.placement(variant), clean, "{variant}");
        }
        assert_eq!(clean.key.domain_shard, "annotations_example_com");
        assert!(clean.key.sub_shard.is_none());
    }

    #[test]
    fn test_sub_shard_is_stable_across_routers() {
        let url = "https://google.com/search?q=x&utm_source=newsletter";
        let a = ShardRouter::default().shard_key(url);
        let b = ShardRouter::new(&ShardConfig::default()).unwrap().shard_key(url);

        assert_eq!(a, b);
        assert_eq!(a.domain_shard, "annotations_google_com");
        let sub = a.sub_shard.as_deref().unwrap();
        assert!(sub.starts_with("annotations_google_com_shard_"));
        assert_eq!(a, ShardRouter::default().shard_key("https://google.com/search?q=x"));
    }

    #[tokio::test]
    async fn test_written_with_tracking_read_without() {
        let node = TestNode::standalone();
        node.publish(&alice(), PAGE, "a1", "hello").await;

        for url in [
            "https://example.com/page",
            "https://example.com/page/",
            "https://example.com/page?utm_campaign=other",
        ] {
            let response = node.read(url).await.unwrap();
            assert_eq!(response.annotations.len(), 1, "{url}");
        }
    }
}
