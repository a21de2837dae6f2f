//! Replay detection by strictly increasing timestamps.

/// Monotonic guard over report timestamps.
///
/// Remembers only the last accepted timestamp. A candidate is admitted when
/// it is strictly greater; duplicates and anything older are refused. Checking
/// and committing are separate so a report can be rejected by later checks
/// without advancing the guard.
#[derive(Debug, Default, Clone)]
pub struct SequenceGuard {
    /// Timestamp of the last accepted report
    last_accepted: Option<i64>,
}

impl SequenceGuard {
    /// Create a guard that has not accepted anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `timestamp` may be accepted. Does not change state.
    pub fn admits(&self, timestamp: i64) -> bool {
        match self.last_accepted {
            None => true,
            Some(last) => timestamp > last,
        }
    }

    /// Record `timestamp` as the last accepted one.
    ///
    /// Callers must have checked [`admits`](Self::admits) first.
    pub fn commit(&mut self, timestamp: i64) {
        debug_assert!(self.admits(timestamp));
        self.last_accepted = Some(timestamp);
    }

    /// Timestamp of the last accepted report, if any.
    pub fn last_accepted(&self) -> Option<i64> {
        self.last_accepted
    }

    /// Forget the last accepted timestamp.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
