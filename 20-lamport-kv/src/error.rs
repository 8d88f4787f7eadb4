use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::message::{ErrorResponse, NotFoundResponse};

/// Errors raised while parsing node configuration from the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("peer id cannot be empty in '{0}'")]
    EmptyPeerId(String),

    #[error("peer url must start with http:// or https://, got '{0}'")]
    InvalidPeerUrl(String),

    #[error("delay rule must look like SRC:DST=MILLIS, got '{0}'")]
    MalformedDelay(String),

    #[error("invalid delay milliseconds in '{rule}': {reason}")]
    InvalidDelayMillis { rule: String, reason: String },
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("not found")]
    RouteNotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(reason)),
            )
                .into_response(),
            ApiError::RouteNotFound => {
                (StatusCode::NOT_FOUND, Json(NotFoundResponse::default())).into_response()
            }
        }
    }
}

/// Errors returned by [`crate::client::NodeClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
}
