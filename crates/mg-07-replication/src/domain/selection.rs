//! Relay target selection.

use mg_01_peer_directory::PeerEntry;

/// Up to `fanout` peers, most recently heard from first, skipping `exclude`
/// (usually the peer the change came from).
pub fn select_relay_targets(
    peers: &[PeerEntry],
    exclude: Option<&str>,
    fanout: usize,
) -> Vec<PeerEntry> {
    let mut targets: Vec<PeerEntry> = peers
        .iter()
        .filter(|peer| Some(peer.record.url.as_str()) != exclude)
        .cloned()
        .collect();
    targets.sort_by(|a, b| {
        b.record
            .last_connection
            .cmp(&a.record.last_connection)
            .then_with(|| a.key.cmp(&b.key))
    });
    targets.truncate(fanout);
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::PeerRecord;

    fn peer(url: &str, last_connection: u64) -> PeerEntry {
        PeerEntry {
            key: url.to_string(),
            record: PeerRecord {
                url: url.to_string(),
                timestamp: 0,
                last_connection,
            },
        }
    }

    #[test]
    fn test_freshest_first_and_truncated() {
        let peers = vec![peer("a", 1), peer("b", 3), peer("c", 2)];
        let targets = select_relay_targets(&peers, None, 2);
        let urls: Vec<&str> = targets.iter().map(|p| p.record.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "c"]);
    }

    #[test]
    fn test_excludes_sender() {
        let peers = vec![peer("a", 1), peer("b", 3)];
        let targets = select_relay_targets(&peers, Some("b"), 8);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].record.url, "a");
    }
}
