//! # Read Scenarios
//!
//! End-to-end publish-then-read flows on one node.

#[cfg(test)]
mod tests {
    use crate::harness::{alice, bob, TestNode};
    use mg_03_shard_router::ShardingApi;
    use mg_05_annotation_reads::ReadError;
    use mg_06_deletion::DeletionApi;

    const PAGE: &str = "https://example.com/page?utm_source=x";
    const SEARCH: &str = "https://google.com/search?q=x";

    #[tokio::test]
    async fn test_scenario_a1_on_tracked_url() {
        let node = TestNode::standalone();
        let (alice, bob) = (alice(), bob());
        let soul = node.publish(&alice, PAGE, "a1", "Great article!").await;
        assert!(soul.as_str().starts_with("annotations_example_com/"));

        assert!(node
            .put(node.comment_put(&bob, &soul, "c1", "Agreed"))
            .await
            .is_applied());

        let response = node.read("https://example.com/page").await.unwrap();
        assert_eq!(response.annotations.len(), 1);
        let view = &response.annotations[0];
        assert_eq!(view.annotation.id, "a1");
        assert_eq!(view.annotation.content, "Great article!");
        assert_eq!(view.annotation.author, alice.did());
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].comment.id, "c1");
        assert_eq!(view.comments[0].comment.author, bob.did());

        let single = node.read_one(PAGE, "a1").await.unwrap();
        assert_eq!(single.annotations.len(), 1);
        assert_eq!(single.annotations[0].annotation.id, "a1");
    }

    #[tokio::test]
    async fn test_not_found_and_missing_url() {
        let node = TestNode::standalone();
        node.publish(&alice(), PAGE, "a1", "hello").await;

        assert!(matches!(node.read_one(PAGE, "zz").await, Err(ReadError::NotFound)));
        assert!(matches!(
            node.read("https://example.com/other").await,
            Err(ReadError::NotFound)
        ));
        assert!(matches!(node.read("  ").await, Err(ReadError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_deleted_comment_is_hidden() {
        let node = TestNode::standalone();
        let (alice, bob) = (alice(), bob());
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;
        let comment = node.comment_put(&bob, &soul, "c1", "first");
        let comment_soul = comment.soul.clone();
        assert!(node.put(comment).await.is_applied());
        assert!(node
            .put(node.comment_put(&bob, &soul, "c2", "second"))
            .await
            .is_applied());

        node.container.deletion.soft_delete(&bob, &comment_soul).await.unwrap();

        let response = node.read(PAGE).await.unwrap();
        let ids: Vec<_> = response.annotations[0]
            .comments
            .iter()
            .map(|view| view.comment.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c2"]);
    }

    #[tokio::test]
    async fn test_ten_annotations_on_high_traffic_page() {
        let node = TestNode::standalone();
        let alice = alice();
        let key = node.container.router.shard_key(SEARCH);
        let sub_shard = key.sub_shard.clone().unwrap();

        let mut ids = Vec::new();
        for i in 0..10 {
            let id = format!("g{i}");
            let soul = node.publish(&alice, SEARCH, &id, &format!("note {i}")).await;
            assert!(soul.as_str().starts_with(&format!("{sub_shard}/")));
            ids.push(id);
            node.time.advance(1_000);
        }

        let response = node.read(SEARCH).await.unwrap();
        let got: Vec<_> = response
            .annotations
            .iter()
            .map(|view| view.annotation.id.clone())
            .collect();
        let newest_first: Vec<_> = ids.iter().rev().cloned().collect();
        assert_eq!(got, newest_first);

        for id in &ids {
            let single = node.read_one(SEARCH, id).await.unwrap();
            assert_eq!(&single.annotations[0].annotation.id, id);
        }
    }

    #[tokio::test]
    async fn test_domain_shard_content_still_read_for_high_traffic_page() {
        let node = TestNode::standalone();
        let placement = node.container.router.placement(SEARCH);
        let domain_location = placement.locations()[0].clone();
        assert_ne!(domain_location, placement.primary_location());

        // Content written before the domain was split lives in the domain shard.
        let mut put = node.annotation_put(&alice(), SEARCH, "legacy", "old");
        put.soul = shared_types::Soul::annotation(&domain_location, "legacy");
        assert!(node.put(put).await.is_applied());
        node.publish(&alice(), SEARCH, "fresh", "new").await;

        let response = node.read(SEARCH).await.unwrap();
        assert_eq!(response.annotations.len(), 2);
    }
}
