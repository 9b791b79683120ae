use crate::clock::{elapsed, Millis};
use crate::config::Config;
use crate::layer::Layer;

/// A discrete footswitch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Stable press.
    Press,
    /// Stable release after `duration_ms`.
    Release { duration_ms: u32 },
    /// A short press with no second tap inside the double-tap window.
    /// Delivered only once the window has elapsed.
    Tap { crossed_hold: bool },
    /// Two short presses, the second released inside the window.
    DoubleTap { crossed_hold: bool },
    /// The hold threshold was reached while pressed (once per press).
    Hold,
    /// The reprogram threshold was reached on the Settings layer (once per press).
    LongHold,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct PendingTap {
    released_at: Millis,
    crossed_hold: bool,
}

/// Turns stable footswitch transitions and press duration into gestures.
///
/// Hold and LongHold are edge events raised while the switch is down;
/// Tap/DoubleTap are decided at release, so a press that delivered a Hold
/// can still classify as a tap. Such taps carry `crossed_hold`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GestureClassifier {
    pressed: bool,
    press_start: Millis,
    press_layer: Layer,
    hold_delivered: bool,
    long_hold_fired: bool,
    pending: Option<PendingTap>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureClassifier {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            press_start: 0,
            press_layer: Layer::Performance,
            hold_delivered: false,
            long_hold_fired: false,
            pending: None,
        }
    }

    // ── Stable transitions ───────────────────────────────────────────

    /// Record a stable press on `layer`.
    pub fn press(&mut self, now: Millis, layer: Layer) -> Gesture {
        self.pressed = true;
        self.press_start = now;
        self.press_layer = layer;
        self.hold_delivered = false;
        self.long_hold_fired = false;
        Gesture::Press
    }

    /// Record a stable release and classify the press.
    ///
    /// Returns the [`Gesture::Release`] plus a [`Gesture::DoubleTap`] when
    /// this release completes one. A first short press only arms a pending
    /// tap; see [`take_pending_tap()`](Self::take_pending_tap).
    pub fn release(&mut self, now: Millis, cfg: &Config) -> (Gesture, Option<Gesture>) {
        self.pressed = false;
        let duration_ms = elapsed(self.press_start, now);
        let release = Gesture::Release { duration_ms };

        if self.long_hold_fired {
            self.pending = None;
            return (release, None);
        }

        let ceiling = match self.press_layer {
            Layer::Performance => cfg.tap_max_ms,
            Layer::Settings => cfg.settings_tap_max_ms,
        };
        if duration_ms >= ceiling {
            return (release, None);
        }

        let crossed_hold = duration_ms >= cfg.hold_threshold_ms;
        match self.pending {
            Some(first) if elapsed(first.released_at, now) <= cfg.double_tap_window_ms => {
                self.pending = None;
                let crossed_hold = crossed_hold || first.crossed_hold;
                (release, Some(Gesture::DoubleTap { crossed_hold }))
            }
            _ => {
                self.pending = Some(PendingTap {
                    released_at: now,
                    crossed_hold,
                });
                (release, None)
            }
        }
    }

    // ── Time-driven events ───────────────────────────────────────────

    /// Deliver the pending single tap once the double-tap window has passed.
    pub fn take_pending_tap(&mut self, now: Millis, cfg: &Config) -> Option<Gesture> {
        let pending = self.pending?;
        if elapsed(pending.released_at, now) >= cfg.double_tap_window_ms {
            self.pending = None;
            return Some(Gesture::Tap {
                crossed_hold: pending.crossed_hold,
            });
        }
        None
    }

    /// Deliver [`Gesture::Hold`] once per press after the hold threshold.
    ///
    /// Level-checked: a caller that skips a tick (e.g. during the switch
    /// mute) still receives the Hold later if the switch is still down.
    pub fn take_hold(&mut self, now: Millis, cfg: &Config) -> Option<Gesture> {
        if self.pressed
            && !self.hold_delivered
            && elapsed(self.press_start, now) >= cfg.hold_threshold_ms
        {
            self.hold_delivered = true;
            return Some(Gesture::Hold);
        }
        None
    }

    /// Deliver [`Gesture::LongHold`] once per press, only if the press
    /// began on the Settings layer and the Settings layer is still active.
    pub fn take_long_hold(&mut self, now: Millis, layer: Layer, cfg: &Config) -> Option<Gesture> {
        if self.pressed
            && !self.long_hold_fired
            && self.press_layer == Layer::Settings
            && layer == Layer::Settings
            && elapsed(self.press_start, now) >= cfg.reprogram_hold_ms
        {
            self.long_hold_fired = true;
            return Some(Gesture::LongHold);
        }
        None
    }

    // ── Cancellation / queries ───────────────────────────────────────

    /// Drop a pending single tap (layer change, boot programming).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn has_pending_tap(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Layer that was active when the current/last press began.
    pub fn press_layer(&self) -> Layer {
        self.press_layer
    }
}
