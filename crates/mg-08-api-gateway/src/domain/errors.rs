//! # Gateway Errors
//!
//! Every error leaves the gateway as a JSON `{"error": "..."}` body.
//!
//! | Error | Status |
//! |-------|--------|
//! | `NotFound` | 404 |
//! | `BadRequest` | 400 |
//! | `Internal` | 500 (logged) |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mg_01_peer_directory::PeerDirectoryError;
use mg_02_graph_store::GraphError;
use mg_05_annotation_reads::ReadError;
use mg_07_replication::ReplicationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// The listener could not be bound or the server failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReadError> for GatewayError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::NotFound => Self::NotFound(e.to_string()),
            ReadError::MissingUrl => Self::BadRequest(e.to_string()),
            ReadError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<GraphError> for GatewayError {
    fn from(e: GraphError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<PeerDirectoryError> for GatewayError {
    fn from(e: PeerDirectoryError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<ReplicationError> for GatewayError {
    fn from(e: ReplicationError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "[mg-08] Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_errors_map_to_status() {
        assert_eq!(
            GatewayError::from(ReadError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(ReadError::MissingUrl).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(ReadError::Internal("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
