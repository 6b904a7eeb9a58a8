//! Connection lifecycle states.

use std::fmt;

/// Lifecycle of the single logical client connection.
///
/// The supervisor's background task is the only writer; every other
/// component observes. `Closed` is terminal for a generation: only a new
/// `start` call leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been requested yet.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The tunnel is up.
    Connected,
    /// The tunnel dropped or the attempt failed; the reconnect policy
    /// decides what happens next.
    Disconnected,
    /// Torn down by the caller.
    Closed,
}

impl ConnectionState {
    /// Whether the tunnel is currently up.
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether a `start` call is legal from this state.
    pub const fn accepts_start(self) -> bool {
        matches!(self, Self::Idle | Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connected_reports_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Idle.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(!ConnectionState::Closed.is_connected());
    }

    #[test]
    fn start_is_legal_from_idle_and_closed_only() {
        assert!(ConnectionState::Idle.accepts_start());
        assert!(ConnectionState::Closed.accepts_start());
        assert!(!ConnectionState::Connecting.accepts_start());
        assert!(!ConnectionState::Connected.accepts_start());
        assert!(!ConnectionState::Disconnected.accepts_start());
    }
}
