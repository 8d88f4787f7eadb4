//! JSON bodies of the node HTTP API.
//!
//! Field names are the interoperability surface between nodes and clients and
//! must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::LocalWrite;
use crate::store::Entry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutResponse {
    pub ok: bool,
    pub key: String,
    pub value: Value,
    pub ts: u64,
    pub lamport: u64,
}

impl From<LocalWrite> for PutResponse {
    fn from(write: LocalWrite) -> Self {
        Self {
            ok: true,
            key: write.key,
            value: write.entry.value,
            ts: write.entry.ts,
            lamport: write.lamport,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetParams {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    pub ok: bool,
    pub key: String,
    pub value: Value,
    pub ts: u64,
    pub origin: String,
    pub lamport: u64,
}

impl GetResponse {
    pub fn found(key: String, entry: Entry, lamport: u64) -> Self {
        Self {
            ok: true,
            key,
            value: entry.value,
            ts: entry.ts,
            origin: entry.origin,
            lamport,
        }
    }
}

/// Body of a `/get` for a key the node has never seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMissingResponse {
    pub ok: bool,
}

impl Default for KeyMissingResponse {
    fn default() -> Self {
        Self { ok: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub node: String,
    pub lamport: u64,
    pub store: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub lamport: u64,
    pub store: BTreeMap<String, Entry>,
}

/// A write pushed from its origin node to a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateRequest {
    pub key: String,
    pub value: Value,
    pub ts: u64,
    pub origin: String,
}

impl From<&LocalWrite> for ReplicateRequest {
    fn from(write: &LocalWrite) -> Self {
        Self {
            key: write.key.clone(),
            value: write.entry.value.clone(),
            ts: write.entry.ts,
            origin: write.entry.origin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateResponse {
    pub ok: bool,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
}

impl Default for NotFoundResponse {
    fn default() -> Self {
        Self {
            error: "not found".to_string(),
        }
    }
}
