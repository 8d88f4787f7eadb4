//! Node identity, peers, and injected replication delays.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default bound on every peer request (replicate and sync).
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(2);

/// A peer node reachable over HTTP.
///
/// Written `ID=URL` on the command line. A bare `URL` uses the URL itself as
/// the id, which is enough when no delay rules target that peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: String,
    pub url: String,
}

impl Peer {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full URL of an endpoint on this peer, e.g. `endpoint("/sync")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

impl FromStr for Peer {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (id, url) = match raw.split_once('=') {
            Some((id, url)) => (id.trim(), url.trim()),
            None => (raw, raw),
        };
        if id.is_empty() {
            return Err(ConfigError::EmptyPeerId(raw.to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidPeerUrl(url.to_string()));
        }
        Ok(Peer::new(id, url))
    }
}

/// One `(source, destination) -> delay` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayRule {
    pub source: String,
    pub destination: String,
    pub delay: Duration,
}

impl FromStr for DelayRule {
    type Err = ConfigError;

    /// Parses `SRC:DST=MILLIS`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedDelay(raw.to_string());
        let (pair, millis) = raw.trim().split_once('=').ok_or_else(malformed)?;
        let (source, destination) = pair.split_once(':').ok_or_else(malformed)?;
        let (source, destination) = (source.trim(), destination.trim());
        if source.is_empty() || destination.is_empty() {
            return Err(malformed());
        }
        let millis: u64 = millis
            .trim()
            .parse()
            .map_err(|err: std::num::ParseIntError| ConfigError::InvalidDelayMillis {
                rule: raw.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            source: source.to_string(),
            destination: destination.to_string(),
            delay: Duration::from_millis(millis),
        })
    }
}

/// Delay injected before sending a replication message from one node to
/// another. Pairs without a rule get no delay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayPolicy {
    rules: HashMap<(String, String), Duration>,
}

impl DelayPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the delay for `source -> destination`.
    pub fn with_delay(
        mut self,
        source: impl Into<String>,
        destination: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.rules.insert((source.into(), destination.into()), delay);
        self
    }

    pub fn delay_for(&self, source: &str, destination: &str) -> Duration {
        self.rules
            .get(&(source.to_string(), destination.to_string()))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<DelayRule> for DelayPolicy {
    fn from_iter<I: IntoIterator<Item = DelayRule>>(iter: I) -> Self {
        iter.into_iter().fold(DelayPolicy::new(), |policy, rule| {
            policy.with_delay(rule.source, rule.destination, rule.delay)
        })
    }
}

/// Immutable configuration of one node, fixed at startup.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: String,
    pub listen: SocketAddr,
    /// Replication visits peers in this order.
    pub peers: Vec<Peer>,
    pub delays: DelayPolicy,
    pub peer_timeout: Duration,
}

impl NodeConfig {
    pub fn new(node_id: impl Into<String>, listen: SocketAddr) -> Self {
        Self {
            node_id: node_id.into(),
            listen,
            peers: Vec::new(),
            delays: DelayPolicy::default(),
            peer_timeout: DEFAULT_PEER_TIMEOUT,
        }
    }

    pub fn with_peers(mut self, peers: Vec<Peer>) -> Self {
        self.peers = peers;
        self
    }

    pub fn with_delays(mut self, delays: DelayPolicy) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = timeout;
        self
    }
}
