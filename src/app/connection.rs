//! Connection supervision — edge detection over the link flag.
//!
//! The Bluedroid connect/disconnect callbacks only flip an atomic flag;
//! this supervisor compares that flag against its previous observation
//! once per loop iteration, so every side effect of a connection change
//! (resync, clear-queue drop, re-advertise) runs in main-loop context.
//!
//! Re-advertising after a disconnect is deferred by a settle delay —
//! restarting advertising inside the disconnect handling window is
//! unreliable on the Bluedroid stack.

/// Link state as last observed by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// An observed edge on the link flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTransition {
    Connected,
    Disconnected,
}

pub struct ConnectionSupervisor {
    state: ConnectionState,
    settle_ms: u32,
    /// Set on disconnect; advertising restarts once the settle delay
    /// has elapsed.
    readvertise_armed_ms: Option<u32>,
}

impl ConnectionSupervisor {
    pub fn new(settle_ms: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            settle_ms,
            readvertise_armed_ms: None,
        }
    }

    /// Compare the live link flag against the previous observation.
    /// Returns the transition, if one happened since the last poll.
    pub fn poll(&mut self, link_up: bool, now_ms: u32) -> Option<ConnectionTransition> {
        match (self.state, link_up) {
            (ConnectionState::Disconnected, true) => {
                self.state = ConnectionState::Connected;
                self.readvertise_armed_ms = None;
                Some(ConnectionTransition::Connected)
            }
            (ConnectionState::Connected, false) => {
                self.state = ConnectionState::Disconnected;
                self.readvertise_armed_ms = Some(now_ms);
                Some(ConnectionTransition::Disconnected)
            }
            _ => None,
        }
    }

    /// True exactly once, when the post-disconnect settle delay expires.
    pub fn due_readvertise(&mut self, now_ms: u32) -> bool {
        match self.readvertise_armed_ms {
            Some(armed_ms) if now_ms.wrapping_sub(armed_ms) >= self.settle_ms => {
                self.readvertise_armed_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: u32 = 500;

    fn make() -> ConnectionSupervisor {
        ConnectionSupervisor::new(SETTLE)
    }

    #[test]
    fn edges_reported_once() {
        let mut c = make();
        assert_eq!(c.poll(true, 0), Some(ConnectionTransition::Connected));
        assert_eq!(c.poll(true, 10), None);
        assert_eq!(c.poll(false, 20), Some(ConnectionTransition::Disconnected));
        assert_eq!(c.poll(false, 30), None);
    }

    #[test]
    fn steady_state_is_silent() {
        let mut c = make();
        for t in 0..10 {
            assert_eq!(c.poll(false, t * 10), None);
        }
        assert!(!c.is_connected());
    }

    #[test]
    fn readvertise_waits_for_settle_delay() {
        let mut c = make();
        c.poll(true, 0);
        c.poll(false, 1000);
        assert!(!c.due_readvertise(1000));
        assert!(!c.due_readvertise(1000 + SETTLE - 1));
        assert!(c.due_readvertise(1000 + SETTLE));
        assert!(!c.due_readvertise(1000 + SETTLE * 2), "fires once");
    }

    #[test]
    fn reconnect_cancels_pending_readvertise() {
        let mut c = make();
        c.poll(true, 0);
        c.poll(false, 100);
        assert_eq!(c.poll(true, 200), Some(ConnectionTransition::Connected));
        assert!(
            !c.due_readvertise(100 + SETTLE * 2),
            "client came back before the deadline"
        );
    }

    #[test]
    fn no_readvertise_without_a_disconnect() {
        let mut c = make();
        assert!(!c.due_readvertise(SETTLE * 10));
        c.poll(true, 0);
        assert!(!c.due_readvertise(SETTLE * 10));
    }
}
