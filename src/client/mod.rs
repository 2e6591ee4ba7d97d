//! ICD client module.
//!
//! This module provides the main entry point for talking to a backend.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Session handle: connect, request, subscribe, close |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientConfig`] | Validated configuration |
//! | [`RequestOptions`] | Per-request timeout and correlation predicate |
//! | [`Stream`] | Subscription plus [`CompletionPolicy`] |
//! | [`Session`] / [`SessionState`] | Registered session and lifecycle |
//!
//! # Example
//!
//! ```no_run
//! use icd_client::{Client, CompletionPolicy, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder()
//!     .url("ws://localhost:3002")
//!     .build()?;
//! let session = client.connect().await?;
//!
//! let tiles = client.stream(CompletionPolicy::raster_tiles(3)?);
//! let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 0).await?;
//! assert!(ack.success);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client configuration and defaults.
pub mod config;

/// Core client implementation.
pub mod core;

/// Typed convenience operations.
pub mod ops;

/// Session lifecycle types.
pub mod session;

/// Composite completion combinator.
pub mod stream;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use config::ClientConfig;
pub use core::{Client, RequestOptions};
pub use session::{Session, SessionState};
pub use stream::{Collector, CompletionPolicy, MessageFilter, Stream};
