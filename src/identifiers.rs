//! Type-safe identifiers.
//!
//! Newtype wrappers keep frame-level request ids and backend session ids
//! from being mixed with plain integers or with each other.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Request id carried in every frame header.
///
/// Outbound frames get a fresh id from a [`RequestIdGenerator`]; inbound
/// frames carry whatever the backend echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u32);

impl RequestId {
    /// Creates a request id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RequestIdGenerator
// ============================================================================

/// Monotonic source of outbound request ids.
///
/// Starts at 1; 0 is left for unsolicited backend frames.
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: AtomicU32,
}

impl RequestIdGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Returns the next id. Wraps around after `u32::MAX`, skipping 0.
    pub fn next(&self) -> RequestId {
        loop {
            let id = self.next.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return RequestId(id);
            }
        }
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Backend session id.
///
/// Zero asks the backend to allocate a new session; any other value
/// requests resumption of that session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u32);

impl SessionId {
    /// Session id meaning "allocate a new session".
    pub const NEW: Self = Self(0);

    /// Creates a session id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this asks for a new session.
    #[inline]
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_starts_at_one() {
        let ids = RequestIdGenerator::new();
        assert_eq!(ids.next(), RequestId::new(1));
        assert_eq!(ids.next(), RequestId::new(2));
    }

    #[test]
    fn test_generator_skips_zero_on_wrap() {
        let ids = RequestIdGenerator {
            next: AtomicU32::new(u32::MAX),
        };
        assert_eq!(ids.next().as_u32(), u32::MAX);
        assert_eq!(ids.next().as_u32(), 1);
    }

    #[test]
    fn test_session_id_new() {
        assert!(SessionId::NEW.is_new());
        assert!(!SessionId::new(42).is_new());
        assert_eq!(SessionId::new(42).to_string(), "42");
    }

    #[test]
    fn test_request_id_serde_transparent() {
        let json = serde_json::to_string(&RequestId::new(9)).expect("serialize");
        assert_eq!(json, "9");
    }
}
