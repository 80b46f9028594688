//! Connection state machine
//!
//! Tracks session connectivity as reported by the engine. Only engine reports
//! move it; every real transition tells the owner whether lanes must become
//! runnable (entering Connected) or stop (entering Idle).

/// Connectivity of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected (initial)
    #[default]
    Idle,
    /// First connection attempt in progress
    Connecting,
    /// Media may flow
    Connected,
    /// Connection lost, engine is recovering
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change that actually happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl Transition {
    /// New `runnable` value for every lane, if this transition changes it
    ///
    /// Connecting and Reconnecting leave lanes alone.
    pub fn lane_runnable(&self) -> Option<bool> {
        match self.to {
            ConnectionState::Connected => Some(true),
            ConnectionState::Idle => Some(false),
            ConnectionState::Connecting | ConnectionState::Reconnecting => None,
        }
    }
}

/// Connection state machine
#[derive(Debug, Default)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
    transitions: u64,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether lanes may currently run
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Number of transitions since creation
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Apply an engine report
    ///
    /// A report equal to the current state is not a transition.
    pub(crate) fn apply(&mut self, reported: ConnectionState) -> Option<Transition> {
        if reported == self.state {
            tracing::trace!(state = %reported, "Duplicate connection state report");
            return None;
        }

        let transition = Transition {
            from: self.state,
            to: reported,
        };
        self.state = reported;
        self.transitions += 1;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lifecycle() {
        let mut machine = ConnectionStateMachine::new();
        assert_eq!(machine.state(), ConnectionState::Idle);
        assert!(!machine.is_connected());

        let t = machine.apply(ConnectionState::Connecting).unwrap();
        assert_eq!(t.from, ConnectionState::Idle);
        assert_eq!(t.lane_runnable(), None);

        let t = machine.apply(ConnectionState::Connected).unwrap();
        assert_eq!(t.lane_runnable(), Some(true));
        assert!(machine.is_connected());

        let t = machine.apply(ConnectionState::Reconnecting).unwrap();
        assert_eq!(t.lane_runnable(), None);
        assert!(!machine.is_connected());

        let t = machine.apply(ConnectionState::Idle).unwrap();
        assert_eq!(t.from, ConnectionState::Reconnecting);
        assert_eq!(t.lane_runnable(), Some(false));

        assert_eq!(machine.transitions(), 4);
    }

    #[test]
    fn test_duplicate_report_is_not_a_transition() {
        let mut machine = ConnectionStateMachine::new();

        assert!(machine.apply(ConnectionState::Idle).is_none());
        machine.apply(ConnectionState::Connected).unwrap();
        assert!(machine.apply(ConnectionState::Connected).is_none());

        assert_eq!(machine.transitions(), 1);
    }

    #[test]
    fn test_idle_to_connected_directly() {
        let mut machine = ConnectionStateMachine::new();

        let t = machine.apply(ConnectionState::Connected).unwrap();

        assert_eq!(t.from, ConnectionState::Idle);
        assert_eq!(t.to, ConnectionState::Connected);
        assert_eq!(t.lane_runnable(), Some(true));
    }
}
