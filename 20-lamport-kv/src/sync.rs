//! Startup snapshot pull from peers.
//!
//! A node asks every peer for `/sync` once, folds each peer's clock into its
//! own, and merges the returned entries with the usual LWW rule. Unreachable
//! peers are skipped, so a node can come up alone.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info};

use crate::client::NodeClient;
use crate::config::Peer;
use crate::state::NodeState;

/// What a bootstrap pull achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub peers_reached: usize,
    pub entries_applied: usize,
}

/// Pulls and merges a snapshot from every peer concurrently.
pub async fn bootstrap(state: Arc<NodeState>, peers: &[Peer], timeout: Duration) -> SyncReport {
    let http = reqwest::Client::new();
    let pulls = peers.iter().map(|peer| {
        let client = NodeClient::with_http(http.clone(), &peer.url, timeout);
        let state = Arc::clone(&state);
        async move {
            match client.sync().await {
                Ok(snapshot) => {
                    let applied = state.merge_snapshot(snapshot.lamport, snapshot.store);
                    debug!(peer = %peer.id, applied, "merged peer snapshot");
                    Some(applied)
                }
                Err(err) => {
                    debug!(peer = %peer.id, error = %err, "skipping unreachable peer");
                    None
                }
            }
        }
    });

    let report = join_all(pulls)
        .await
        .into_iter()
        .flatten()
        .fold(SyncReport::default(), |report, applied| SyncReport {
            peers_reached: report.peers_reached + 1,
            entries_applied: report.entries_applied + applied,
        });

    info!(
        node = %state.node_id(),
        peers_reached = report.peers_reached,
        peers_total = peers.len(),
        entries_applied = report.entries_applied,
        lamport = state.lamport(),
        "bootstrap sync finished"
    );
    report
}
