//! WebSocket transport layer.
//!
//! This module handles the binary WebSocket between the client and the
//! backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  ICD backend    │
//! │                 │     binary WebSocket         │                 │
//! │  Connection     │◄────────────────────────────►│  WebSocket      │
//! │  → InboundSink  │        ws:// or wss://       │  Server         │
//! │  → Router       │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Handshake within the connect timeout
//! 2. Status becomes `Active`; the reader task feeds the `InboundSink`
//! 3. `Connection::send` - Queue outbound frames
//! 4. `Connection::shutdown` - Close the socket (also on drop)
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionStatus, InboundSink};
