//! HTTP control surface of a node.
//!
//! Client routes (`/put`, `/get`, `/status`) and peer routes (`/replicate`,
//! `/sync`) share one [`NodeState`]. A PUT answers as soon as the local write
//! is applied; replication runs in its own task.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::error::ApiError;
use crate::message::{
    GetParams, GetResponse, KeyMissingResponse, PutRequest, PutResponse, ReplicateRequest,
    ReplicateResponse, StatusResponse, SyncResponse,
};
use crate::replication::Replicator;
use crate::state::NodeState;
use crate::sync;

/// Shared handle passed to every handler.
#[derive(Clone)]
pub struct AppState {
    node: Arc<NodeState>,
    replicator: Replicator,
}

impl AppState {
    pub fn new(node: Arc<NodeState>, replicator: Replicator) -> Self {
        Self { node, replicator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/put", post(put_key).fallback(not_found))
        .route("/get", get(get_key).fallback(not_found))
        .route("/status", get(status).fallback(not_found))
        .route("/sync", get(sync_snapshot).fallback(not_found))
        .route("/replicate", post(replicate).fallback(not_found))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn put_key(
    State(app): State<AppState>,
    payload: Result<Json<PutRequest>, JsonRejection>,
) -> Result<Json<PutResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let write = app.node.local_write(&request.key, request.value);
    debug!(key = %write.key, ts = write.entry.ts, "applied local write");
    // Detached: the client never waits on peers.
    drop(app.replicator.replicate(ReplicateRequest::from(&write)));

    Ok(Json(PutResponse::from(write)))
}

async fn get_key(
    State(app): State<AppState>,
    params: Result<Query<GetParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(GetParams { key }) =
        params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let response = match app.node.lookup(&key) {
        Some((entry, lamport)) => Json(GetResponse::found(key, entry, lamport)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(KeyMissingResponse::default())).into_response(),
    };
    Ok(response)
}

async fn status(State(app): State<AppState>) -> Json<StatusResponse> {
    let (lamport, store) = app.node.status();
    Json(StatusResponse {
        node: app.node.node_id().to_string(),
        lamport,
        store,
    })
}

async fn sync_snapshot(State(app): State<AppState>) -> Json<SyncResponse> {
    let (lamport, store) = app.node.status();
    Json(SyncResponse { lamport, store })
}

async fn replicate(
    State(app): State<AppState>,
    payload: Result<Json<ReplicateRequest>, JsonRejection>,
) -> Result<Json<ReplicateResponse>, ApiError> {
    let Json(write) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let applied = app
        .node
        .receive_write(&write.key, write.value, write.ts, &write.origin);
    debug!(
        key = %write.key,
        ts = write.ts,
        origin = %write.origin,
        applied,
        "received replicated write"
    );

    Ok(Json(ReplicateResponse { ok: true, applied }))
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// A bound node, ready to serve.
pub struct Node {
    listener: TcpListener,
    config: NodeConfig,
    state: Arc<NodeState>,
}

impl Node {
    /// Binds `config.listen`. Port 0 picks an ephemeral port.
    pub async fn bind(config: NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("failed to bind {}", config.listen))?;
        Ok(Self::from_listener(listener, config))
    }

    /// Wraps an already bound listener; `config.listen` is ignored.
    pub fn from_listener(listener: TcpListener, config: NodeConfig) -> Self {
        let state = Arc::new(NodeState::new(config.node_id.clone()));
        Self {
            listener,
            config,
            state,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<NodeState> {
        Arc::clone(&self.state)
    }

    /// Serves until `shutdown` resolves.
    ///
    /// Bootstrap sync starts in the background at the same time, so the node
    /// answers requests even while every peer is still unreachable.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Node {
            listener,
            config,
            state,
        } = self;

        let replicator = Replicator::new(
            config.node_id.clone(),
            config.peers.clone(),
            config.delays.clone(),
            config.peer_timeout,
        );
        let app = router(AppState::new(Arc::clone(&state), replicator));

        let peers = config.peers.clone();
        let timeout = config.peer_timeout;
        tokio::spawn(async move {
            sync::bootstrap(state, &peers, timeout).await;
        });

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("http server failed")?;

        info!(node = %config.node_id, "node stopped");
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}
