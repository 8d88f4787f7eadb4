//! Lamport logical clock.

/// Scalar logical clock owned by a single node.
///
/// The clock is a plain value; callers that share it across tasks keep it
/// behind the same lock as the store (see [`crate::state::NodeState`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LamportClock {
    counter: u64,
}

impl LamportClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock for a locally originated event.
    pub fn tick_local(&mut self) -> u64 {
        self.counter = self.counter.saturating_add(1);
        self.counter
    }

    /// Folds a timestamp carried by an incoming message into local time.
    ///
    /// Sets the counter to `max(counter, remote_ts) + 1`.
    pub fn tick_receive(&mut self, remote_ts: u64) -> u64 {
        self.counter = self.counter.max(remote_ts).saturating_add(1);
        self.counter
    }

    pub fn peek(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ticks_are_sequential() {
        let mut clock = LamportClock::new();
        assert_eq!(clock.peek(), 0);
        assert_eq!(clock.tick_local(), 1);
        assert_eq!(clock.tick_local(), 2);
        assert_eq!(clock.peek(), 2);
    }

    #[test]
    fn receive_jumps_past_remote_timestamp() {
        let mut clock = LamportClock::new();
        clock.tick_local();
        assert_eq!(clock.tick_receive(10), 11);
        assert_eq!(clock.peek(), 11);
    }

    #[test]
    fn receive_of_older_timestamp_still_advances() {
        let mut clock = LamportClock::new();
        for _ in 0..5 {
            clock.tick_local();
        }
        assert_eq!(clock.tick_receive(2), 6);
        assert_eq!(clock.tick_receive(6), 7);
        assert_eq!(clock.tick_receive(0), 8);
    }

    #[test]
    fn counter_saturates_instead_of_wrapping() {
        let mut clock = LamportClock::new();
        assert_eq!(clock.tick_receive(u64::MAX), u64::MAX);
        assert_eq!(clock.tick_local(), u64::MAX);
    }
}
