//! Error types for catalog lookups and configuration.
//!
//! Steady-state operation never fails: index arithmetic is modular and
//! durations are clamped. These errors only surface at the API edges
//! (explicit slot assignment, mode lookup by index, config validation).

use core::fmt;

/// Errors from preset and settings catalog lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetError {
    /// Preset index is out of bounds (must be < PRESET_COUNT).
    InvalidPresetIndex,
    /// Settings index is out of bounds (must be < SETTINGS_COUNT).
    InvalidSettingIndex,
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PresetError::InvalidPresetIndex => write!(f, "Invalid preset index (must be 0-16)"),
            PresetError::InvalidSettingIndex => write!(f, "Invalid settings index (must be 0-6)"),
        }
    }
}

/// Errors reported by [`Config::validate()`](crate::Config::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// MIDI channel must be 0–15.
    InvalidChannel,
    /// A [`TimeRange`](crate::TimeRange) has `min_ms > max_ms`.
    EmptyRange,
    /// Curve blend must be 0–1000 per mille.
    InvalidCurve,
    /// The hold threshold must be strictly below the reprogram threshold.
    HoldNotBelowReprogram,
    /// A scan, read or double-tap interval is zero.
    ZeroInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidChannel => write!(f, "MIDI channel must be 0-15"),
            ConfigError::EmptyRange => write!(f, "Time range minimum exceeds maximum"),
            ConfigError::InvalidCurve => write!(f, "Curve blend must be 0-1000"),
            ConfigError::HoldNotBelowReprogram => {
                write!(f, "Hold threshold must be below the reprogram threshold")
            }
            ConfigError::ZeroInterval => write!(f, "Intervals must be non-zero"),
        }
    }
}

/// Errors from driving the analog bypass relay pair.
#[derive(Debug)]
pub enum RelayError<A, B> {
    /// Writing the effect (A) leg failed.
    PinA(A),
    /// Writing the bypass (B) leg failed.
    PinB(B),
}

impl<A: fmt::Debug, B: fmt::Debug> fmt::Display for RelayError<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelayError::PinA(e) => write!(f, "Relay A pin error: {:?}", e),
            RelayError::PinB(e) => write!(f, "Relay B pin error: {:?}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl<A: defmt::Format, B: defmt::Format> defmt::Format for RelayError<A, B> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RelayError::PinA(e) => defmt::write!(f, "Relay A pin error: {}", e),
            RelayError::PinB(e) => defmt::write!(f, "Relay B pin error: {}", e),
        }
    }
}
