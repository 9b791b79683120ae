//! Performance modes and the settings catalog used to pick them.

use crate::config::{Config, TimeRange};
use crate::error::PresetError;

/// The seven performance engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Latch,
    Momentary,
    Holding,
    Shutter,
    Harmony,
    StepSeq,
    Legacy,
}

/// One entry of the settings catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingEntry {
    pub name: &'static str,
    pub mode: Mode,
    /// Program previewed (as its bypass) while this entry is scanned.
    pub display_program: u8,
}

/// Number of entries in [`SETTINGS`].
pub const SETTINGS_COUNT: usize = 7;

/// Settings catalog, scanned in boot stage 2 and on the Settings layer.
pub const SETTINGS: [SettingEntry; SETTINGS_COUNT] = [
    SettingEntry { name: "Mode: Latch", mode: Mode::Latch, display_program: 16 },
    SettingEntry { name: "Mode: Momentary", mode: Mode::Momentary, display_program: 15 },
    SettingEntry { name: "Mode: Holding", mode: Mode::Holding, display_program: 14 },
    SettingEntry { name: "Mode: Shutter", mode: Mode::Shutter, display_program: 13 },
    SettingEntry { name: "Mode: Harmony", mode: Mode::Harmony, display_program: 12 },
    SettingEntry { name: "Mode: Step Sequencer", mode: Mode::StepSeq, display_program: 11 },
    SettingEntry { name: "Mode: Legacy", mode: Mode::Legacy, display_program: 10 },
];

impl Mode {
    /// Mode for a settings catalog index.
    ///
    /// ```
    /// use neo_remote::Mode;
    ///
    /// assert_eq!(Mode::from_setting_index(3), Ok(Mode::Shutter));
    /// assert!(Mode::from_setting_index(7).is_err());
    /// ```
    pub fn from_setting_index(index: usize) -> Result<Mode, PresetError> {
        SETTINGS
            .get(index)
            .map(|entry| entry.mode)
            .ok_or(PresetError::InvalidSettingIndex)
    }

    /// Position of this mode in [`SETTINGS`].
    pub fn setting_index(self) -> usize {
        SETTINGS
            .iter()
            .position(|entry| entry.mode == self)
            .unwrap_or(0)
    }

    /// Pot-mapped duration range, or `None` for modes with a fixed time.
    pub fn time_range(self, cfg: &Config) -> Option<TimeRange> {
        match self {
            Mode::Holding => Some(cfg.holding_range),
            Mode::Shutter => Some(cfg.shutter_range),
            Mode::Harmony | Mode::StepSeq => Some(cfg.step_range),
            Mode::Latch | Mode::Momentary | Mode::Legacy => None,
        }
    }

    /// Whether the double-tap preset swap is available in this mode.
    pub fn allows_preset_switch(self) -> bool {
        self != Mode::Legacy
    }
}
