//! Monotonic millisecond time with wraparound-safe arithmetic.
//!
//! The host supplies a free-running `u32` millisecond counter that wraps
//! after ~49.7 days. All comparisons go through [`elapsed()`] and
//! [`is_due()`] so a wrap in the middle of a press or a pending deadline
//! never produces a bogus duration.

/// Milliseconds on the host's monotonic counter.
pub type Millis = u32;

/// Monotonic millisecond source.
///
/// The firmware implements this over its timer driver and feeds
/// [`Clock::now_ms`] to every controller call.
pub trait Clock {
    /// Current time in milliseconds. May wrap.
    fn now_ms(&self) -> Millis;

    /// Milliseconds since `since`, see [`elapsed()`].
    fn since(&self, since: Millis) -> u32 {
        elapsed(since, self.now_ms())
    }
}

/// Milliseconds from `since` to `now`, correct across one counter wrap.
///
/// ```
/// use neo_remote::clock::elapsed;
///
/// assert_eq!(elapsed(100, 350), 250);
/// assert_eq!(elapsed(u32::MAX - 9, 10), 20);
/// ```
pub fn elapsed(since: Millis, now: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Deadline `delay_ms` after `now`.
pub fn deadline_after(now: Millis, delay_ms: u32) -> Millis {
    now.wrapping_add(delay_ms)
}

/// Returns `true` once `now` has reached or passed `deadline`.
///
/// Uses the signed difference, so deadlines up to ~24 days in the future
/// are handled correctly across a wrap.
pub fn is_due(now: Millis, deadline: Millis) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}
