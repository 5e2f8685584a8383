//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8765;

/// Outer bound on one request. Above the read path's collection window.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Largest accepted request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// `GET /recent` page size when the client gives none.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// HTTP gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Socket the HTTP server binds to
    pub listen_addr: SocketAddr,
    pub cors: CorsConfig,
    pub request_timeout_ms: u64,
    pub max_body_bytes: usize,
    pub recent_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            cors: CorsConfig::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// CORS configuration. Browser extensions call the gateway from arbitrary
/// page origins, so everything is allowed unless narrowed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            max_age: 86400,
        }
    }
}
