//! # HTTP Peer Transport
//!
//! Peers are addressed by their graph endpoint (`https://host/graph`):
//!
//! | Call | Request |
//! |------|---------|
//! | `send` | `POST <peer>` with a JSON [`GraphMessage`] |
//! | `fetch_children` | `GET <peer>/children?soul=<parent>` |
//! | `fetch_node` | `GET <peer>/node?soul=<soul>` (404 when absent) |

use crate::domain::{GraphMessage, ReplicationError};
use crate::ports::PeerTransport;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared_types::{Node, Soul};
use std::time::Duration;

pub struct HttpPeerTransport {
    client: Client,
}

fn transport_error(peer: &str, error: impl ToString) -> ReplicationError {
    ReplicationError::Transport {
        peer: peer.to_string(),
        message: error.to_string(),
    }
}

fn check_status(peer: &str, response: Response) -> Result<Response, ReplicationError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(transport_error(peer, format!("status {}", response.status())))
    }
}

impl HttpPeerTransport {
    /// Client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ReplicationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport_error("local", e))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        peer_url: &str,
        path: &str,
        soul: &Soul,
    ) -> Result<Option<T>, ReplicationError> {
        let url = format!("{}/{}", peer_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .query(&[("soul", soul.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(peer_url, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = check_status(peer_url, response)?
            .json::<T>()
            .await
            .map_err(|e| ReplicationError::InvalidResponse {
                peer: peer_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(body))
    }
}

#[async_trait]
impl PeerTransport for HttpPeerTransport {
    async fn send(&self, peer_url: &str, message: &GraphMessage) -> Result<(), ReplicationError> {
        let response = self
            .client
            .post(peer_url)
            .json(message)
            .send()
            .await
            .map_err(|e| transport_error(peer_url, e))?;
        check_status(peer_url, response).map(|_| ())
    }

    async fn fetch_children(
        &self,
        peer_url: &str,
        parent: &Soul,
    ) -> Result<Vec<Node>, ReplicationError> {
        Ok(self
            .get_json::<Vec<Node>>(peer_url, "children", parent)
            .await?
            .unwrap_or_default())
    }

    async fn fetch_node(
        &self,
        peer_url: &str,
        soul: &Soul,
    ) -> Result<Option<Node>, ReplicationError> {
        self.get_json::<Node>(peer_url, "node", soul).await
    }
}
