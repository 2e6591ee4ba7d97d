//! Client configuration.
//!
//! [`ClientConfig`] holds everything a [`Client`](super::Client) needs to
//! reach a backend and register a session. Build it with
//! [`ClientBuilder`](super::ClientBuilder), which validates every field.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::identifiers::SessionId;

// ============================================================================
// Constants
// ============================================================================

/// Default WebSocket handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for unary requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on in-flight unary requests.
pub const DEFAULT_MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// ClientConfig
// ============================================================================

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend address, `ws://` or `wss://`.
    pub url: Url,
    /// WebSocket handshake timeout.
    pub connect_timeout: Duration,
    /// Timeout applied to requests without their own.
    pub request_timeout: Duration,
    /// Cap on in-flight unary requests.
    pub max_pending_requests: usize,
    /// API key sent with `RegisterViewer`.
    pub api_key: String,
    /// Session to resume, or [`SessionId::NEW`].
    pub session_id: SessionId,
    /// Feature flags advertised to the backend.
    pub client_feature_flags: u32,
}

impl ClientConfig {
    /// Creates a configuration for `url` with every other field defaulted.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pending_requests: DEFAULT_MAX_PENDING_REQUESTS,
            api_key: String::new(),
            session_id: SessionId::NEW,
            client_feature_flags: 0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
