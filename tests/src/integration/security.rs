//! # Write Validation Flows
//!
//! Forged and unauthorized writes are refused at the store boundary: they
//! are never persisted, never relayed, and leave a security-log entry
//! against the acting DID.

#[cfg(test)]
mod tests {
    use crate::harness::{admin, alice, bob, eventually, TestNode};
    use mg_06_deletion::{DeletionApi, DeletionError, DeletionRequest, Lifecycle};
    use mg_07_replication::LoopbackNetwork;
    use shared_types::{fields, GraphPut};

    const PAGE: &str = "https://example.com/page?utm_source=x";

    fn logged_labels(node: &TestNode, did: &str) -> Vec<&'static str> {
        node.container
            .validator
            .security_log()
            .by_actor(did)
            .into_iter()
            .map(|event| event.rejection.label())
            .collect()
    }

    // =========================================================================
    // SIGNATURES
    // =========================================================================

    #[tokio::test]
    async fn test_tampered_content_is_rejected() {
        let node = TestNode::standalone();
        let alice = alice();
        let mut put = node.annotation_put(&alice, PAGE, "a1", "original");
        put.data
            .as_mut()
            .unwrap()
            .insert(fields::CONTENT.into(), "tampered".into());

        assert!(node.put(put.clone()).await.is_rejected());
        assert!(node.get(&put.soul).is_none());
        assert!(logged_labels(&node, &alice.did()).contains(&"invalid_signature"));
    }

    #[tokio::test]
    async fn test_signature_by_another_key_is_rejected() {
        let node = TestNode::standalone();
        let mut put = node.annotation_put(&bob(), PAGE, "a1", "hello");
        put.data
            .as_mut()
            .unwrap()
            .insert(fields::AUTHOR.into(), alice().did().into());

        assert!(node.put(put.clone()).await.is_rejected());
        assert!(node.get(&put.soul).is_none());
    }

    #[tokio::test]
    async fn test_unsigned_content_is_rejected() {
        let node = TestNode::standalone();
        let mut put = node.annotation_put(&alice(), PAGE, "a1", "hello");
        put.data.as_mut().unwrap().remove(fields::SIGNATURE);

        assert!(node.put(put).await.is_rejected());
    }

    #[tokio::test]
    async fn test_rejected_write_is_not_relayed() {
        let network = LoopbackNetwork::new();
        let a = TestNode::on_network(&network, "https://a.test/graph");
        let b = TestNode::on_network(&network, "https://b.test/graph");
        a.connect(&b).await;
        let (stop, relay) = a.spawn_relay();

        let alice = alice();
        let mut forged = a.annotation_put(&alice, PAGE, "forged", "original");
        forged
            .data
            .as_mut()
            .unwrap()
            .insert(fields::CONTENT.into(), "tampered".into());
        assert!(a.put(forged.clone()).await.is_rejected());
        let genuine = a.publish(&alice, PAGE, "genuine", "hello").await;

        assert!(eventually(|| b.get(&genuine).is_some()).await);
        assert!(b.get(&forged.soul).is_none());

        stop.send(true).unwrap();
        relay.await.unwrap();
    }

    // =========================================================================
    // DELETION AUTHORITY
    // =========================================================================

    #[tokio::test]
    async fn test_non_owner_delete_is_rejected() {
        let node = TestNode::standalone();
        let (alice, bob) = (alice(), bob());
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;

        let request = DeletionRequest::sign(&bob, soul.clone(), node.now(), "bob-1");
        // Bob may sign a record, but it does not authorize the flag.
        assert!(node.put(request.record_put()).await.is_applied());
        assert!(node.put(request.flag_put()).await.is_rejected());

        assert_eq!(
            node.container.deletion.lifecycle(&soul).unwrap(),
            Lifecycle::Active
        );
        assert!(logged_labels(&node, &bob.did()).contains(&"unauthorized_deletion"));
        assert_eq!(node.read(PAGE).await.unwrap().annotations.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_api_refuses_non_owner() {
        let node = TestNode::standalone();
        let soul = node.publish(&alice(), PAGE, "a1", "hello").await;

        let result = node.container.deletion.soft_delete(&bob(), &soul).await;
        assert!(matches!(result, Err(DeletionError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_flag_without_record_is_rejected() {
        let node = TestNode::standalone();
        let alice = alice();
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;

        let mut flag = GraphPut::field(soul.clone(), fields::IS_DELETED, true);
        flag.data
            .get_or_insert_with(Default::default)
            .insert(fields::DELETED_BY.into(), alice.did().into());
        assert!(node.put(flag).await.is_rejected());
        assert!(logged_labels(&node, &alice.did()).contains(&"missing_deletion_record"));
    }

    #[tokio::test]
    async fn test_deleted_by_must_match_record_author() {
        let node = TestNode::standalone();
        let (alice, bob) = (alice(), bob());
        let soul = node.publish(&alice, PAGE, "a1", "hello").await;

        let request = DeletionRequest::sign(&alice, soul.clone(), node.now(), "alice-1");
        assert!(node.put(request.record_put()).await.is_applied());
        let mut flag = request.flag_put();
        flag.data
            .as_mut()
            .unwrap()
            .insert(fields::DELETED_BY.into(), bob.did().into());
        assert!(node.put(flag).await.is_rejected());
    }

    #[tokio::test]
    async fn test_admin_may_delete_any_content() {
        let admin = admin();
        let node = TestNode::with_admins(vec![admin.did()]);
        let soul = node.publish(&alice(), PAGE, "a1", "hello").await;

        let receipt = node.container.deletion.soft_delete(&admin, &soul).await.unwrap();
        assert_eq!(receipt.deleted_by, admin.did());
        let stored = node.get(&soul).unwrap();
        assert_eq!(stored.text(fields::AUTHOR), Some(alice().did().as_str()));
    }
}
