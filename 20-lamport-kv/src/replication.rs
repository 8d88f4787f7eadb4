//! Best-effort push of local writes to peers.
//!
//! Each local write gets its own detached task. The task visits peers in
//! configured order, sleeps for any injected delay, then posts the write to the
//! peer's `/replicate` endpoint. Failures are logged and dropped: there is no
//! retry and the client that produced the write is never told.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::NodeClient;
use crate::config::{DelayPolicy, Peer};
use crate::message::ReplicateRequest;

#[derive(Debug, Clone)]
pub struct Replicator {
    inner: Arc<ReplicatorInner>,
}

#[derive(Debug)]
struct ReplicatorInner {
    node_id: String,
    peers: Vec<Peer>,
    delays: DelayPolicy,
    timeout: Duration,
    http: reqwest::Client,
}

impl Replicator {
    pub fn new(
        node_id: impl Into<String>,
        peers: Vec<Peer>,
        delays: DelayPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ReplicatorInner {
                node_id: node_id.into(),
                peers,
                delays,
                timeout,
                http: reqwest::Client::new(),
            }),
        }
    }

    /// Spawns the delivery of `write` to every peer and returns immediately.
    ///
    /// The handle resolves once every peer has been attempted. Dropping it
    /// leaves the task running.
    pub fn replicate(&self, write: ReplicateRequest) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.deliver_to_all(&write).await;
        })
    }
}

impl ReplicatorInner {
    async fn deliver_to_all(&self, write: &ReplicateRequest) {
        for peer in &self.peers {
            let delay = self.delays.delay_for(&self.node_id, &peer.id);
            if !delay.is_zero() {
                info!(
                    node = %self.node_id,
                    peer = %peer.id,
                    key = %write.key,
                    delay_ms = delay.as_millis() as u64,
                    "delaying replication"
                );
                tokio::time::sleep(delay).await;
            }
            self.deliver(peer, write).await;
        }
    }

    async fn deliver(&self, peer: &Peer, write: &ReplicateRequest) {
        let client = NodeClient::with_http(self.http.clone(), &peer.url, self.timeout);
        match client.replicate(write).await {
            Ok(response) => debug!(
                node = %self.node_id,
                peer = %peer.id,
                key = %write.key,
                ts = write.ts,
                applied = response.applied,
                "replicated write"
            ),
            Err(err) => warn!(
                node = %self.node_id,
                peer = %peer.id,
                key = %write.key,
                error = %err,
                "replication failed"
            ),
        }
    }
}
