use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use lamport_kv::{
    cli::{Cli, Command},
    client::NodeClient,
    config::DEFAULT_PEER_TIMEOUT,
    server::Node,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(body: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Node(args) => {
            let config = args.into_config();
            let node = Node::bind(config.clone()).await?;
            let addr = node.local_addr()?;
            println!("node {} listening on {}", config.node_id, addr);
            info!(
                node = %config.node_id,
                peers = config.peers.len(),
                delays = !config.delays.is_empty(),
                "node started"
            );
            if let Err(err) = node.run_until_ctrl_c().await {
                warn!("node exited with error: {err:?}");
                return Err(err);
            }
        }
        Command::Put(args) => {
            let client = NodeClient::new(args.target.node, DEFAULT_PEER_TIMEOUT);
            let response = client
                .put(&args.key, Value::String(args.value))
                .await
                .context("put failed")?;
            print_json(&response)?;
        }
        Command::Get(args) => {
            let client = NodeClient::new(args.target.node, DEFAULT_PEER_TIMEOUT);
            match client.get(&args.key).await.context("get failed")? {
                Some(response) => print_json(&response)?,
                None => print_json(&json!({ "ok": false }))?,
            }
        }
        Command::Status(args) => {
            let client = NodeClient::new(args.node, DEFAULT_PEER_TIMEOUT);
            let response = client.status().await.context("status failed")?;
            print_json(&response)?;
        }
    }

    Ok(())
}
