//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use icd_client::Client;
//!
//! # fn example() -> icd_client::Result<()> {
//! let client = Client::builder()
//!     .url("ws://localhost:3002")
//!     .request_timeout(Duration::from_secs(10))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::SessionId;

use super::config::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_PENDING_REQUESTS, DEFAULT_REQUEST_TIMEOUT,
};
use super::core::Client;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Backend address, unparsed.
    url: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
    max_pending_requests: usize,
    api_key: String,
    session_id: SessionId,
    client_feature_flags: u32,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            url: None,
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
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default settings and no URL.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend address.
    ///
    /// # Arguments
    ///
    /// * `url` - WebSocket URL (e.g., "ws://localhost:3002")
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the default timeout for unary requests.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the cap on in-flight unary requests.
    #[inline]
    #[must_use]
    pub fn max_pending_requests(mut self, max: usize) -> Self {
        self.max_pending_requests = max;
        self
    }

    /// Sets the API key sent at registration.
    #[inline]
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Asks the backend to resume an existing session.
    #[inline]
    #[must_use]
    pub fn session_id(mut self, id: SessionId) -> Self {
        self.session_id = id;
        self
    }

    /// Sets the feature flags advertised at registration.
    #[inline]
    #[must_use]
    pub fn client_feature_flags(mut self, flags: u32) -> Self {
        self.client_feature_flags = flags;
        self
    }

    /// Validates the settings without creating a client.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn into_config(self) -> Result<ClientConfig> {
        let url = self.validate_url()?;
        self.validate_timeouts()?;
        self.validate_limits()?;

        Ok(ClientConfig {
            url,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            max_pending_requests: self.max_pending_requests,
            api_key: self.api_key,
            session_id: self.session_id,
            client_feature_flags: self.client_feature_flags,
        })
    }

    /// Builds the client with validation.
    ///
    /// The client starts disconnected; call [`Client::connect`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is missing, unparsable or not `ws`/`wss`
    /// - [`Error::Config`] if a timeout or the pending limit is zero
    pub fn build(self) -> Result<Client> {
        Ok(Client::new(self.into_config()?))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the URL configuration.
    fn validate_url(&self) -> Result<Url> {
        let raw = self.url.as_deref().ok_or_else(|| {
            Error::config(
                "Backend URL is required. Use .url() to set it.\n\
                 Example: Client::builder().url(\"ws://localhost:3002\")",
            )
        })?;

        let url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid backend URL '{raw}': {e}")))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "Unsupported URL scheme '{other}'. Expected ws:// or wss://"
            ))),
        }
    }

    /// Validates timeout configuration.
    fn validate_timeouts(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::config("connect_timeout must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config("request_timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Validates limits.
    fn validate_limits(&self) -> Result<()> {
        if self.max_pending_requests == 0 {
            return Err(Error::config(
                "max_pending_requests must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
