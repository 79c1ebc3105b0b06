//! Time and reset collaborators

/// Monotonic millisecond clock
///
/// The counter is 32 bits wide and wraps after roughly 49 days; consumers
/// compare timestamps with wrapping subtraction.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// One-shot reset timer
///
/// The reset is irrevocable once scheduled. The delay gives in-flight
/// messages time to leave the radio.
pub trait ResetScheduler {
    fn schedule_reset(&mut self, delay_ms: u32);
}
