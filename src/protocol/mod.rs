//! ICD protocol message types and frame codec.
//!
//! This module defines the closed catalog of messages exchanged with the
//! backend and how they are framed on the wire.
//!
//! # Protocol Overview
//!
//! | Kind | Direction | Purpose |
//! |------|-----------|---------|
//! | Request | Local → Backend | Expects one unary response |
//! | Command | Local → Backend | Fire-and-forget |
//! | Unary | Backend → Local | Answers a request |
//! | Streamed | Backend → Local | Push data (tiles, histograms, profiles, ...) |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message_type` | Type ids and their classification |
//! | `frame` | Header layout, encode and decode |
//! | `message` | `Payload` union, `Message`, message traits |
//! | `request` | Outbound requests and commands |
//! | `response` | Unary responses |
//! | `stream` | Streamed push messages |
//! | `types` | Structures shared between messages |

// ============================================================================
// Submodules
// ============================================================================

/// Frame header and codec.
pub mod frame;

/// Decoded messages and message traits.
pub mod message;

/// Message type catalog.
pub mod message_type;

/// Outbound requests and commands.
pub mod request;

/// Unary responses.
pub mod response;

/// Streamed push messages.
pub mod stream;

/// Shared structures.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{FrameHeader, HEADER_LEN, ICD_VERSION};
pub use message::{InboundMessage, Message, OutboundMessage, Payload, UnaryRequest};
pub use message_type::{MessageKind, MessageType};
pub use request::*;
pub use response::*;
pub use stream::*;
pub use types::*;
