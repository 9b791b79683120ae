//! Preset catalog, the two user slots and the Latch selection.
//!
//! The catalog is a fixed table of 17 presets whose index equals the
//! Program Change number (bypass twins live at index + 17). The user
//! assigns two of them to slots A and B during boot programming; the
//! performance layer double-tap swaps between them.
//!
//! ```text
//! Index  Program  Name
//!   0       0     Detune Shallow
//!   …
//!   8       8     Harmony: Oct/Oct    ┐
//!   …                                 ├ harmony pool used by Harmony/StepSeq
//!  15      15     Harmony: b3rd/3rd   ┘
//!  16      16     Harmony: 2nd/3rd
//! ```

use crate::error::PresetError;

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preset {
    /// Display name (logging only).
    pub name: &'static str,
    /// Program Change number of the active sound.
    pub program: u8,
}

/// Number of entries in [`PRESETS`].
pub const PRESET_COUNT: usize = 17;

/// The fixed preset catalog. `PRESETS[i].program == i`.
pub const PRESETS: [Preset; PRESET_COUNT] = [
    Preset { name: "Detune Shallow", program: 0 },
    Preset { name: "Detune Deep", program: 1 },
    Preset { name: "Whammy: Up 2 Oct", program: 2 },
    Preset { name: "Whammy: Up 1 Oct", program: 3 },
    Preset { name: "Whammy: Down 1 Oct", program: 4 },
    Preset { name: "Whammy: Down 2 Oct", program: 5 },
    Preset { name: "Whammy: Dive Bomb", program: 6 },
    Preset { name: "Whammy: Drop Tune", program: 7 },
    Preset { name: "Harmony: Oct/Oct", program: 8 },
    Preset { name: "Harmony: 5th/4th", program: 9 },
    Preset { name: "Harmony: 4th/3rd", program: 10 },
    Preset { name: "Harmony: 5th/7th", program: 11 },
    Preset { name: "Harmony: 5th/6th", program: 12 },
    Preset { name: "Harmony: 4th/5th", program: 13 },
    Preset { name: "Harmony: 3rd/4th", program: 14 },
    Preset { name: "Harmony: b3rd/3rd", program: 15 },
    Preset { name: "Harmony: 2nd/3rd", program: 16 },
];

/// Programs stepped through by the Harmony and StepSeq engines, ascending.
pub const HARMONY_POOL: [u8; 8] = [8, 9, 10, 11, 12, 13, 14, 15];

/// One of the two user slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    /// Slot for a boot stage (0 → A, anything else → B).
    pub fn for_stage(stage: u8) -> Slot {
        if stage == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }
}

/// Slot A and slot B, each unassigned or holding a catalog index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresetSlots {
    slots: [Option<usize>; 2],
}

impl PresetSlots {
    /// Both slots unassigned.
    pub const fn new() -> Self {
        Self { slots: [None; 2] }
    }

    /// Catalog index assigned to `slot`, if any.
    pub fn get(&self, slot: Slot) -> Option<usize> {
        self.slots[slot.index()]
    }

    /// Assign a catalog index to `slot`.
    ///
    /// Returns [`PresetError::InvalidPresetIndex`] if `index >= PRESET_COUNT`.
    pub fn assign(&mut self, slot: Slot, index: usize) -> Result<(), PresetError> {
        if index >= PRESET_COUNT {
            return Err(PresetError::InvalidPresetIndex);
        }
        self.slots[slot.index()] = Some(index);
        Ok(())
    }

    /// Returns `true` when both A and B hold a preset.
    pub fn both_assigned(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Program for `slot`; an unassigned slot reads as program 0.
    pub fn program(&self, slot: Slot) -> u8 {
        self.get(slot).map_or(0, |idx| PRESETS[idx].program)
    }
}

/// Latch-mode selection: which slot sounds and whether the effect is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveSelection {
    pub active_slot: Slot,
    pub effect_enabled: bool,
}

impl Default for ActiveSelection {
    fn default() -> Self {
        Self {
            active_slot: Slot::A,
            effect_enabled: true,
        }
    }
}
