use super::*;
use crate::domain::{DirectoryConfig, PeerDirectoryError};
use crate::ports::PeerDirectoryApi;
use mg_02_graph_store::{
    BincodeNodeSerializer, GraphApi, GraphStore, GraphStoreConfig, InMemoryKVStore,
};
use shared_bus::{EventFilter, EventTopic, GraphEvent, InMemoryEventBus};
use shared_crypto::peer_key;
use shared_types::{fields, GraphPut, ManualTimeSource, Soul, TimeSource, WriteOrigin};
use std::sync::Arc;
use std::time::Duration;

const START: u64 = 1_700_000_000_000;
const SELF_URL: &str = "https://self.example/graph";
const PEER_URL: &str = "https://peer.example/graph";
const MINUTE: u64 = 60 * 1000;

struct Fixture {
    directory: Arc<PeerDirectory>,
    store: Arc<GraphStore>,
    bus: Arc<InMemoryEventBus>,
    time: Arc<ManualTimeSource>,
}

fn fixture_with(public_url: Option<&str>) -> Fixture {
    let bus = Arc::new(InMemoryEventBus::new());
    let time = Arc::new(ManualTimeSource::new(START));
    let store = Arc::new(GraphStore::new(
        Box::new(InMemoryKVStore::new()),
        Arc::new(BincodeNodeSerializer),
        bus.clone(),
        time.clone(),
        GraphStoreConfig::default(),
    ));
    let config = DirectoryConfig {
        public_url: public_url.map(str::to_string),
        ..DirectoryConfig::default()
    };
    let directory =
        Arc::new(PeerDirectory::new(store.clone(), bus.clone(), time.clone(), config).unwrap());
    Fixture {
        directory,
        store,
        bus,
        time,
    }
}

fn fixture() -> Fixture {
    fixture_with(Some(SELF_URL))
}

#[tokio::test]
async fn test_register_self_keyed_by_url_hash() {
    let f = fixture();
    let entry = f.directory.register_self().await.unwrap();
    assert_eq!(entry.key, peer_key(SELF_URL));
    assert_eq!(f.directory.own_key(), Some(entry.key.as_str()));

    let node = f.store.get(&Soul::peer(&entry.key)).unwrap().unwrap();
    assert_eq!(node.text(fields::URL), Some(SELF_URL));
    assert_eq!(node.int(fields::TIMESTAMP), Some(START as i64));
}

#[tokio::test]
async fn test_refresh_keeps_first_seen() {
    let f = fixture();
    f.directory.register_self().await.unwrap();
    f.time.advance(5 * MINUTE);
    let entry = f.directory.refresh_self().await.unwrap();
    assert_eq!(entry.record.timestamp, START);
    assert_eq!(entry.record.last_connection, START + 5 * MINUTE);
}

#[tokio::test]
async fn test_peer_connect_upserts() {
    let f = fixture();
    let first = f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(2 * MINUTE);
    let second = f.directory.on_peer_connect(PEER_URL).await.unwrap();
    assert_eq!(first.key, second.key);
    assert_eq!(second.record.timestamp, START);
    assert_eq!(second.record.last_connection, START + 2 * MINUTE);

    let live = f.directory.live_peers().unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].record.url, PEER_URL);
}

#[tokio::test]
async fn test_repeated_contacts_are_debounced() {
    let f = fixture();
    f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(10_000);
    let again = f.directory.on_peer_connect(PEER_URL).await.unwrap();
    assert_eq!(again.record.last_connection, START);
}

#[tokio::test]
async fn test_invalid_peer_url_refused() {
    let f = fixture();
    for url in ["ftp://peer.example/graph", "https://peer.example/api", "peer"] {
        assert!(matches!(
            f.directory.on_peer_connect(url).await,
            Err(PeerDirectoryError::InvalidPeerUrl(_))
        ));
    }
}

#[tokio::test]
async fn test_no_public_url() {
    let f = fixture_with(None);
    assert!(matches!(
        f.directory.register_self().await,
        Err(PeerDirectoryError::NoPublicUrl)
    ));
    assert!(PeerDirectory::new(
        f.store.clone(),
        f.bus.clone(),
        f.time.clone(),
        DirectoryConfig {
            public_url: Some("not a url".into()),
            ..DirectoryConfig::default()
        },
    )
    .is_err());
}

#[tokio::test]
async fn test_prune_stale_tombstones_idle_peers_only() {
    let f = fixture();
    let mut pruned_events = f.bus.subscribe(EventFilter::topics(vec![EventTopic::Peers]));

    f.directory.register_self().await.unwrap();
    f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(9 * MINUTE);
    f.directory.on_peer_connect("https://fresh.example/graph").await.unwrap();
    f.time.advance(2 * MINUTE);

    let report = f.directory.prune_stale().await.unwrap();
    assert_eq!(report.pruned_stale, vec![peer_key(PEER_URL)]);
    assert!(f
        .store
        .get(&Soul::peer(&peer_key(PEER_URL)))
        .unwrap()
        .unwrap()
        .is_tombstoned());

    // Own entry is older still but survives.
    let all = f.directory.all_peers().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(f.directory.live_peers().unwrap().len(), 1);

    match pruned_events.recv().await {
        Some(GraphEvent::PeerPruned { key }) => assert_eq!(key, peer_key(PEER_URL)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_prune_removes_invalid_entries() {
    let f = fixture();
    let bogus = Soul::peer("0000000000000000");
    f.store
        .put(
            GraphPut::field(bogus.clone(), fields::URL, "https://x.example/graph"),
            WriteOrigin::Internal,
        )
        .await
        .unwrap();

    let report = f.directory.prune_stale().await.unwrap();
    assert_eq!(report.pruned_invalid, vec!["0000000000000000".to_string()]);
    assert!(f.store.get(&bogus).unwrap().unwrap().is_tombstoned());
}

#[tokio::test]
async fn test_sweeps_are_throttled_and_idempotent() {
    let f = fixture();
    f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(11 * MINUTE);

    let first = f.directory.prune_stale().await.unwrap();
    assert_eq!(first.pruned(), 1);
    let second = f.directory.prune_stale().await.unwrap();
    assert!(second.skipped);

    f.time.advance(MINUTE);
    let third = f.directory.prune_stale().await.unwrap();
    assert!(!third.skipped);
    assert_eq!(third.pruned(), 0);
}

#[tokio::test]
async fn test_startup_threshold_is_looser() {
    let f = fixture();
    f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(30 * MINUTE);

    let startup = f.directory.prune_at_startup().await.unwrap();
    assert_eq!(startup.pruned(), 0);

    f.time.advance(MINUTE);
    let periodic = f.directory.prune_stale().await.unwrap();
    assert_eq!(periodic.pruned_stale.len(), 1);
}

#[tokio::test]
async fn test_reconnect_after_prune_revives_entry() {
    let f = fixture();
    f.directory.on_peer_connect(PEER_URL).await.unwrap();
    f.time.advance(11 * MINUTE);
    f.directory.prune_stale().await.unwrap();

    f.time.advance(MINUTE);
    let entry = f.directory.on_peer_connect(PEER_URL).await.unwrap();
    assert_eq!(entry.record.timestamp, f.time.now_ms());
    assert_eq!(f.directory.live_peers().unwrap().len(), 1);
}

#[tokio::test]
async fn test_contact_listener_records_peers() {
    let f = fixture();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let subscription = f.bus.subscribe(EventFilter::topics(vec![EventTopic::Peers]));
    let handle = tokio::spawn(f.directory.clone().run_contact_listener(subscription, shutdown_rx));

    shared_bus::EventPublisher::publish(
        f.bus.as_ref(),
        GraphEvent::PeerContacted {
            url: PEER_URL.into(),
        },
    )
    .await;

    let mut recorded = false;
    for _ in 0..50 {
        if !f.directory.live_peers().unwrap().is_empty() {
            recorded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(recorded);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
