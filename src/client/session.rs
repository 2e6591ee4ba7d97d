//! Session lifecycle types.

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::SessionId;
use crate::protocol::{RegisterViewerAck, SessionType};

// ============================================================================
// SessionState
// ============================================================================

/// Where the client is in its session lifecycle.
///
/// ```text
/// Disconnected ──connect()──► Connecting ──RegisterViewerAck──► Active
///       ▲                          │                              │
///       └──────── failure ─────────┘◄──── close() / remote close ─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection.
    #[default]
    Disconnected,
    /// Socket handshake or registration in progress.
    Connecting,
    /// Registered; requests may be sent.
    Active,
}

impl SessionState {
    /// Returns `true` if requests may be sent.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

// ============================================================================
// Session
// ============================================================================

/// A registered backend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Id assigned or confirmed by the backend.
    pub id: SessionId,
    /// New or resumed.
    pub session_type: SessionType,
    /// Feature flags the backend supports.
    pub server_feature_flags: u32,
}

impl Session {
    /// Returns `true` if the backend resumed an earlier session.
    #[inline]
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.session_type == SessionType::Resumed
    }
}

impl From<&RegisterViewerAck> for Session {
    fn from(ack: &RegisterViewerAck) -> Self {
        Self {
            id: ack.session_id,
            session_type: ack.session_type,
            server_feature_flags: ack.server_feature_flags,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_disconnected() {
        assert_eq!(SessionState::default(), SessionState::Disconnected);
        assert!(!SessionState::Connecting.is_active());
        assert!(SessionState::Active.is_active());
    }

    #[test]
    fn test_session_from_ack() {
        let ack = RegisterViewerAck {
            session_id: SessionId::new(12),
            success: true,
            session_type: SessionType::Resumed,
            server_feature_flags: 5,
            ..Default::default()
        };

        let session = Session::from(&ack);
        assert_eq!(session.id, SessionId::new(12));
        assert!(session.is_resumed());
        assert_eq!(session.server_feature_flags, 5);
    }
}
