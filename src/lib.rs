//! ICD Client - Async client for remote image-visualization backends.
//!
//! This library talks to a scientific-image visualization backend over one
//! persistent binary WebSocket, speaking the backend's ICD (Interface
//! Control Document) message protocol.
//!
//! # Architecture
//!
//! The client follows a request/stream model:
//!
//! - **Unary calls**: `OpenFile -> OpenFileAck`, resolved or rejected exactly once
//! - **Streams**: tiles, histograms, profiles, contours and progress pushed by
//!   the backend to any number of subscribers
//!
//! Key design principles:
//!
//! - One reader task per connection feeds one [`Router`]; arrival order is preserved
//! - Concurrent same-type requests match FIFO, refined by an optional predicate
//! - Closing retires the connection's router epoch, so nothing leaks past `close`
//! - [`Client`] is an explicit, cloneable handle; there is no global instance
//!
//! # Quick Start
//!
//! ```no_run
//! use icd_client::{Client, CompletionPolicy, MessageType, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .url("ws://localhost:3002")
//!         .build()?;
//!     client.connect().await?;
//!
//!     // Subscribe before triggering the push
//!     let histogram = client.stream(CompletionPolicy::count(
//!         MessageType::RegionHistogramData,
//!         1,
//!     ));
//!     let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 0).await?;
//!     println!("Opened: {}", ack.success);
//!
//!     let messages = histogram.collect().await?;
//!     println!("Histograms: {}", messages.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client handle, configuration, sessions, streams |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | ICD message types and frame codec |
//! | [`router`] | Correlation and stream routing |
//! | [`transport`] | WebSocket transport layer |

// ============================================================================
// Modules
// ============================================================================

/// Client handle and everything built on it.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing request and session ids.
pub mod identifiers;

/// ICD protocol message types and frame codec.
pub mod protocol;

/// Inbound message routing.
///
/// Resolves pending requests and fans out stream messages.
pub mod router;

/// WebSocket transport layer.
///
/// Internal module handling the connection and its reader task.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientBuilder, ClientConfig, Collector, CompletionPolicy, MessageFilter,
    RequestOptions, Session, SessionState, Stream,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, RequestIdGenerator, SessionId};

// Protocol types
pub use protocol::*;

// Router types
pub use router::{Diagnostic, Dispatched, PendingResponse, Router, Subscription};

// Transport types
pub use transport::{Connection, ConnectionStatus, InboundSink};
