//! Controller configuration.
//!
//! All thresholds, ranges and wiring choices live in [`Config`]. There
//! are no module-level timing constants. [`Config::default()`] reproduces
//! the shipping firmware (channel 4, offset bypass, level-selected layer,
//! MIDI back end).

use crate::error::ConfigError;

/// How the program representing an effect's "off" state is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BypassScheme {
    /// `bypass = min(active + 17, 127)`.
    Offset,
    /// Every preset shares one fixed bypass program.
    Fixed(u8),
}

/// Where engine on/off switching happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectBackend {
    /// CC0 arm/disarm plus active/bypass Program Change.
    Midi,
    /// Analog relay pair; MIDI only selects the active program.
    Relay,
}

/// How the layer switch maps onto the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerSwitchMode {
    /// Engaged position = Settings, released position = Performance.
    Level,
    /// Every stable transition flips the layer, regardless of position.
    Toggle,
}

/// Potentiometer-mapped duration range for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeRange {
    /// Shortest duration (pot fully counter-clockwise).
    pub min_ms: u32,
    /// Longest duration (pot fully clockwise).
    pub max_ms: u32,
    /// Quadratic share of the curve in per mille (0 = linear, 1000 = pure square).
    pub curve: u32,
}

impl TimeRange {
    pub const fn new(min_ms: u32, max_ms: u32, curve: u32) -> Self {
        Self { min_ms, max_ms, curve }
    }
}

/// Channel-identification blink (Note On/Off pulses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkConfig {
    pub note: u8,
    pub velocity: u8,
    pub on_ms: u16,
    pub off_ms: u16,
    /// Pulses for the mode-apply confirmation.
    pub times: u8,
    /// Silence before the first pulse.
    pub lead_in_ms: u16,
    /// Also send a true Note-Off (0x80) after each velocity-0 Note On.
    pub strict_note_off: bool,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            note: 60,
            velocity: 100,
            on_ms: 90,
            off_ms: 90,
            times: 3,
            lead_in_ms: 80,
            strict_note_off: true,
        }
    }
}

/// Moving-average pot filter with outlier rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PotFilterConfig {
    /// A sample further than this from the mean counts as an outlier.
    pub max_deviation: u16,
    /// Consecutive same-direction outliers that force a re-prime.
    pub force_after: u8,
}

impl Default for PotFilterConfig {
    fn default() -> Self {
        Self {
            max_deviation: 200,
            force_after: 4,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    // ── MIDI ─────────────────────────────────────────────────────────
    /// 0-based MIDI channel. Default: 3 (CH04).
    pub channel: u8,
    /// Bypass derivation. Default: [`BypassScheme::Offset`].
    pub bypass: BypassScheme,
    /// Engine on/off back end. Default: [`EffectBackend::Midi`].
    pub backend: EffectBackend,

    // ── Switches ─────────────────────────────────────────────────────
    /// Layer switch interpretation. Default: [`LayerSwitchMode::Level`].
    pub layer_mode: LayerSwitchMode,
    /// Debounce settle time. Default: 30.
    pub debounce_ms: u32,
    /// Longest press that still counts as a tap on the Performance layer. Default: 900.
    pub tap_max_ms: u32,
    /// Longest press that still counts as a tap on the Settings layer. Default: 900.
    pub settings_tap_max_ms: u32,
    /// Second tap must be released within this window of the first. Default: 320.
    pub double_tap_window_ms: u32,
    /// Shared trigger point for the sustained engines. Default: 500.
    pub hold_threshold_ms: u32,
    /// Settings-layer long hold that re-enters preset programming. Default: 2000.
    pub reprogram_hold_ms: u32,
    /// Momentary engages on press instead of at the hold threshold. Default: false.
    pub momentary_on_press: bool,

    // ── Timing ───────────────────────────────────────────────────────
    /// Silence after a preset swap before the new baseline is applied. Default: 250.
    pub switch_mute_ms: u32,
    /// Auto-advance interval for boot and settings scanning. Default: 1000.
    pub scan_interval_ms: u32,
    /// Minimum spacing of time-pot reads. Default: 40.
    pub pot_read_interval_ms: u32,
    /// Minimum spacing of shape-pot reads. Default: 60.
    pub shape_read_interval_ms: u32,
    /// Holding auto-off delay range. Default: 200..5000, curve 350.
    pub holding_range: TimeRange,
    /// Shutter half-period range. Default: 30..400, curve 550.
    pub shutter_range: TimeRange,
    /// Harmony/StepSeq step interval range. Default: 60..1000, curve 450.
    pub step_range: TimeRange,
    /// Duration reported for modes without a pot range. Default: 1000.
    pub fixed_time_ms: u32,
    /// Pot filter tuning.
    pub pot_filter: PotFilterConfig,

    // ── Feedback ─────────────────────────────────────────────────────
    /// Channel blink tuning.
    pub blink: BlinkConfig,
    /// Play the power-on animation from [`Controller::startup()`](crate::Controller::startup).
    pub startup_animation: bool,
    /// Dwell per program during the startup animation. Default: 50.
    pub startup_step_ms: u16,
    /// Passes over each startup order. Default: 2.
    pub startup_passes: u8,
    /// Break-before-make gap for the relay back end in µs. Default: 20.
    pub relay_gap_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: 3,
            bypass: BypassScheme::Offset,
            backend: EffectBackend::Midi,
            layer_mode: LayerSwitchMode::Level,
            debounce_ms: 30,
            tap_max_ms: 900,
            settings_tap_max_ms: 900,
            double_tap_window_ms: 320,
            hold_threshold_ms: 500,
            reprogram_hold_ms: 2000,
            momentary_on_press: false,
            switch_mute_ms: 250,
            scan_interval_ms: 1000,
            pot_read_interval_ms: 40,
            shape_read_interval_ms: 60,
            holding_range: TimeRange::new(200, 5000, 350),
            shutter_range: TimeRange::new(30, 400, 550),
            step_range: TimeRange::new(60, 1000, 450),
            fixed_time_ms: 1000,
            pot_filter: PotFilterConfig::default(),
            blink: BlinkConfig::default(),
            startup_animation: true,
            startup_step_ms: 50,
            startup_passes: 2,
            relay_gap_us: 20,
        }
    }
}

impl Config {
    /// Check cross-field constraints.
    ///
    /// # Examples
    ///
    /// ```
    /// use neo_remote::{Config, ConfigError};
    ///
    /// assert!(Config::default().validate().is_ok());
    ///
    /// let cfg = Config { channel: 16, ..Config::default() };
    /// assert_eq!(cfg.validate(), Err(ConfigError::InvalidChannel));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > 15 {
            return Err(ConfigError::InvalidChannel);
        }
        for range in [self.holding_range, self.shutter_range, self.step_range] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::EmptyRange);
            }
            if range.curve > 1000 {
                return Err(ConfigError::InvalidCurve);
            }
        }
        if self.hold_threshold_ms >= self.reprogram_hold_ms {
            return Err(ConfigError::HoldNotBelowReprogram);
        }
        if self.scan_interval_ms == 0
            || self.pot_read_interval_ms == 0
            || self.shape_read_interval_ms == 0
            || self.double_tap_window_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_range() {
        let cfg = Config {
            shutter_range: TimeRange::new(400, 30, 550),
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRange));
    }

    #[test]
    fn rejects_curve_above_one() {
        let cfg = Config {
            step_range: TimeRange::new(60, 1000, 1001),
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidCurve));
    }

    #[test]
    fn rejects_hold_at_reprogram() {
        let cfg = Config {
            hold_threshold_ms: 2000,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::HoldNotBelowReprogram));
    }

    #[test]
    fn rejects_zero_scan_interval() {
        let cfg = Config {
            scan_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroInterval));
    }
}
