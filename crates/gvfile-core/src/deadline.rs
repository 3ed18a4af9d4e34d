//! Absolute deadlines
//!
//! Every suspending channel operation takes a `Deadline`. It is an
//! absolute point in time, so a loop that suspends several times shares
//! one budget instead of restarting a relative timeout on each wait.

use std::time::{Duration, Instant};

/// Absolute point in time after which a wait gives up, or no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// Wait forever.
    pub const NONE: Deadline = Deadline(None);

    #[inline]
    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    /// Deadline `d` from now. Saturates to `NONE` if the instant would
    /// overflow the platform clock.
    pub fn after(d: Duration) -> Self {
        Deadline(Instant::now().checked_add(d))
    }

    #[inline]
    pub fn after_ms(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    #[inline]
    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Time left until the deadline.
    ///
    /// `None` means unbounded. An elapsed deadline yields `Some(ZERO)`.
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn has_expired(&self) -> bool {
        match self.0 {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

impl From<Instant> for Deadline {
    fn from(instant: Instant) -> Self {
        Deadline::at(instant)
    }
}

impl From<Option<Instant>> for Deadline {
    fn from(instant: Option<Instant>) -> Self {
        Deadline(instant)
    }
}
