//! Replicated key-value store ordered by Lamport clocks.
//!
//! Every node is an independent process that accepts writes and reads over
//! HTTP and pushes each local write to a fixed set of peers in the
//! background. Conflicts are resolved with Last-Writer-Wins on the
//! `(timestamp, origin)` pair, so nodes that have seen the same writes hold the
//! same entries no matter in which order those writes arrived.
//!
//! # Modules
//!
//! - [`clock`]: the Lamport counter.
//! - [`store`]: the LWW map from key to `(value, ts, origin)`.
//! - [`state`]: clock and store behind one mutex, with atomic compound
//!   operations for the HTTP handlers.
//! - [`replication`]: fire-and-forget push of local writes, with optional
//!   injected delay per `(source, destination)` pair.
//! - [`sync`]: one-shot snapshot pull from every peer at startup.
//! - [`server`]: axum router and the [`server::Node`] that serves it.
//! - [`client`]: typed HTTP client for the node API.
//! - [`message`]: JSON bodies exchanged between clients and nodes.
//! - [`config`]: node identity, peers, delay rules.
//! - [`cli`]: command-line interface for node and client modes.

pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod replication;
pub mod server;
pub mod state;
pub mod store;
pub mod sync;
