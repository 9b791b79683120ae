use crate::clock::{elapsed, Millis};

/// Settle-time debouncer for one mechanical switch.
///
/// Works on logical levels (`true` = pressed/engaged); the caller handles
/// the pin's active-low inversion. A stable transition is reported once the
/// raw level has stayed unchanged for at least the settle time, so a raw
/// pulse shorter than that never produces one.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedSwitch {
    raw_last: bool,
    last_change_at: Millis,
    stable: bool,
    settle_ms: u32,
}

impl DebouncedSwitch {
    /// Start settled at `initial` as of `now`.
    pub fn new(initial: bool, now: Millis, settle_ms: u32) -> Self {
        Self {
            raw_last: initial,
            last_change_at: now,
            stable: initial,
            settle_ms,
        }
    }

    /// Feed one raw sample.
    ///
    /// Returns `Some(level)` exactly once per stable transition.
    ///
    /// ```
    /// use neo_remote::input::DebouncedSwitch;
    ///
    /// let mut sw = DebouncedSwitch::new(false, 0, 30);
    /// assert_eq!(sw.update(true, 10), None);
    /// assert_eq!(sw.update(true, 39), None);
    /// assert_eq!(sw.update(true, 40), Some(true));
    /// assert_eq!(sw.update(true, 41), None);
    /// ```
    pub fn update(&mut self, raw: bool, now: Millis) -> Option<bool> {
        if raw != self.raw_last {
            self.raw_last = raw;
            self.last_change_at = now;
        }

        if self.stable != self.raw_last && elapsed(self.last_change_at, now) >= self.settle_ms {
            self.stable = self.raw_last;
            return Some(self.stable);
        }
        None
    }

    /// Current debounced level.
    pub fn is_active(&self) -> bool {
        self.stable
    }
}
