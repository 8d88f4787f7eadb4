use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{DelayPolicy, DelayRule, NodeConfig, Peer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a store node.
    Node(NodeArgs),
    /// Write a key on a node.
    Put(PutArgs),
    /// Read a key from a node.
    Get(GetArgs),
    /// Show a node's clock and full store.
    Status(TargetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Identifier of this node; also the LWW tie-breaker.
    #[arg(long)]
    pub id: String,

    /// Socket address to serve HTTP on.
    #[arg(long, default_value = "127.0.0.1:8001")]
    pub listen: SocketAddr,

    /// Peer as ID=URL (or just URL). Repeat for each peer; order is replication order.
    #[arg(long = "peer", value_delimiter = ',')]
    pub peers: Vec<Peer>,

    /// Injected replication delay as SRC:DST=MILLIS. Repeatable.
    #[arg(long = "delay", value_delimiter = ',')]
    pub delays: Vec<DelayRule>,

    /// Timeout for each replicate and sync request to a peer.
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,
}

impl NodeArgs {
    pub fn into_config(self) -> NodeConfig {
        NodeConfig::new(self.id, self.listen)
            .with_peers(self.peers)
            .with_delays(self.delays.into_iter().collect::<DelayPolicy>())
            .with_peer_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Base URL of the node to talk to.
    #[arg(long, default_value = "http://127.0.0.1:8001")]
    pub node: String,
}

#[derive(Args, Debug, Clone)]
pub struct PutArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub key: String,
    pub value: String,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_args_build_config() {
        let cli = Cli::try_parse_from([
            "lamport_kv",
            "node",
            "--id",
            "A",
            "--listen",
            "127.0.0.1:8001",
            "--peer",
            "B=http://127.0.0.1:8002,C=http://127.0.0.1:8003",
            "--delay",
            "A:C=2000",
        ])
        .expect("valid args");

        let Command::Node(args) = cli.command else {
            panic!("expected node command");
        };
        let config = args.into_config();
        assert_eq!(config.node_id, "A");
        assert_eq!(
            config.peers.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["B", "C"]
        );
        assert_eq!(config.delays.delay_for("A", "C"), Duration::from_secs(2));
        assert_eq!(config.peer_timeout, Duration::from_secs(2));
    }

    #[test]
    fn bad_delay_rule_is_rejected() {
        let result = Cli::try_parse_from(["lamport_kv", "node", "--id", "A", "--delay", "A-C"]);
        assert!(result.is_err());
    }

    #[test]
    fn client_commands_parse() {
        let cli = Cli::try_parse_from([
            "lamport_kv",
            "put",
            "--node",
            "http://127.0.0.1:8002",
            "x",
            "1",
        ])
        .expect("valid args");
        assert!(matches!(
            cli.command,
            Command::Put(PutArgs { ref key, ref value, .. }) if key == "x" && value == "1"
        ));

        let cli = Cli::try_parse_from(["lamport_kv", "status"]).expect("valid args");
        assert!(matches!(
            cli.command,
            Command::Status(TargetArgs { ref node }) if node == "http://127.0.0.1:8001"
        ));
    }
}
