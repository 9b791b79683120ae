//! Staged boot programming of the two preset slots and the mode.
//!
//! Stage 0 picks slot A, stage 1 slot B (both scanning [`PRESETS`]),
//! stage 2 picks the mode from [`SETTINGS`]. Each stage auto-advances its
//! selection until a press freezes and commits it; the release then moves
//! on to the next stage.
//!
//! Reprogramming re-enters stage 0 with a copy of the current slots as a
//! staging buffer. The live slots only change when stage 1 completes, so
//! an abort at any earlier point leaves them untouched. An abort during
//! the mode stage keeps the committed slots and the previous mode.

use crate::clock::{elapsed, Millis};
use crate::effects::Emitter;
use crate::mode::{Mode, SETTINGS, SETTINGS_COUNT};
use crate::preset::{PresetSlots, Slot, PRESETS, PRESET_COUNT};

/// Index of the final (mode selection) stage.
pub const MODE_STAGE: u8 = 2;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootProgrammer {
    stage: u8,
    selection_index: usize,
    scan_direction: i8,
    scan_paused: bool,
    last_step_at: Millis,
    staging: Option<PresetSlots>,
    reprogram: bool,
    press_seen: bool,
    chosen_mode: Mode,
    done: bool,
}

impl BootProgrammer {
    /// Fresh power-on programming at stage 0.
    pub fn new(now: Millis) -> Self {
        Self {
            stage: 0,
            selection_index: 0,
            scan_direction: 1,
            scan_paused: false,
            last_step_at: now,
            staging: None,
            reprogram: false,
            press_seen: false,
            chosen_mode: Mode::Latch,
            done: false,
        }
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn selection_index(&self) -> usize {
        self.selection_index
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// `true` while a reprogram (not the initial boot) is in progress,
    /// through all three stages.
    pub fn is_reprogramming(&self) -> bool {
        !self.done && self.reprogram
    }

    /// Slots as they will be committed (staging buffer while reprogramming).
    pub fn pending_slots(&self, live: &PresetSlots) -> PresetSlots {
        self.staging.unwrap_or(*live)
    }

    // ── Stage entry ──────────────────────────────────────────────────

    /// Show the first item of the current stage.
    ///
    /// Preset stages start on the slot's current assignment, the mode
    /// stage on `current_mode`.
    pub(crate) fn begin_stage(
        &mut self,
        now: Millis,
        slots: &PresetSlots,
        current_mode: Mode,
        out: &mut Emitter<'_>,
    ) {
        self.selection_index = if self.stage < MODE_STAGE {
            self.pending_slots(slots)
                .get(Slot::for_stage(self.stage))
                .unwrap_or(0)
        } else {
            current_mode.setting_index()
        };
        self.scan_paused = false;
        self.last_step_at = now;
        self.show(out);
    }

    /// Restart at stage 0, staging a copy of `slots`.
    ///
    /// The press that triggered the reprogram is still down; its release
    /// is ignored.
    pub(crate) fn restart_for_reprogram(
        &mut self,
        now: Millis,
        slots: &PresetSlots,
        current_mode: Mode,
        out: &mut Emitter<'_>,
    ) {
        self.stage = 0;
        self.staging = Some(*slots);
        self.reprogram = true;
        self.press_seen = false;
        self.chosen_mode = current_mode;
        self.done = false;
        self.begin_stage(now, slots, current_mode, out);
        #[cfg(feature = "defmt")]
        defmt::info!("reprogram started");
    }

    /// Abandon a reprogram. The staged selections are discarded.
    pub(crate) fn abort(&mut self) {
        self.staging = None;
        self.reprogram = false;
        self.press_seen = false;
        self.done = true;
        #[cfg(feature = "defmt")]
        defmt::info!("reprogram aborted at stage {}", self.stage);
    }

    // ── Footswitch ───────────────────────────────────────────────────

    /// Stable press: freeze the scan and commit the shown item.
    pub(crate) fn on_press(&mut self, slots: &mut PresetSlots, out: &mut Emitter<'_>) {
        if self.done {
            return;
        }
        self.press_seen = true;
        self.scan_paused = true;

        if self.stage < MODE_STAGE {
            let slot = Slot::for_stage(self.stage);
            let target = self.staging.as_mut().unwrap_or(slots);
            if target.assign(slot, self.selection_index).is_ok() {
                out.confirm_preset(PRESETS[self.selection_index].program);
                #[cfg(feature = "defmt")]
                defmt::info!("slot {} <- preset {}", slot, self.selection_index);
            }
        } else {
            self.chosen_mode = SETTINGS[self.selection_index].mode;
            if self.chosen_mode == Mode::Latch {
                out.effect_on(0);
            } else {
                out.effect_off(0);
            }
        }
    }

    /// Stable release: advance the stage.
    ///
    /// Returns the chosen mode when the last stage completes.
    pub(crate) fn on_release(
        &mut self,
        now: Millis,
        slots: &mut PresetSlots,
        out: &mut Emitter<'_>,
    ) -> Option<Mode> {
        if self.done || !self.press_seen {
            return None;
        }
        self.press_seen = false;

        match self.stage {
            0 => {
                self.stage = 1;
                self.begin_stage(now, slots, self.chosen_mode, out);
                None
            }
            1 => {
                if let Some(staged) = self.staging.take() {
                    *slots = staged;
                    #[cfg(feature = "defmt")]
                    defmt::info!("reprogrammed slots committed");
                }
                self.stage = MODE_STAGE;
                self.begin_stage(now, slots, self.chosen_mode, out);
                None
            }
            _ => {
                self.done = true;
                self.reprogram = false;
                #[cfg(feature = "defmt")]
                defmt::info!("programming done, mode {}", self.chosen_mode);
                Some(self.chosen_mode)
            }
        }
    }

    // ── Scan ─────────────────────────────────────────────────────────

    /// Auto-advance the selection once per interval while not paused.
    pub(crate) fn poll_scan(&mut self, now: Millis, interval_ms: u32, out: &mut Emitter<'_>) {
        if self.done || self.scan_paused {
            return;
        }
        if elapsed(self.last_step_at, now) >= interval_ms {
            let count = if self.stage < MODE_STAGE {
                PRESET_COUNT
            } else {
                SETTINGS_COUNT
            } as i32;
            let next = (self.selection_index as i32 + i32::from(self.scan_direction)).rem_euclid(count);
            self.selection_index = next as usize;
            self.last_step_at = now;
            self.show(out);
        }
    }

    fn show(&self, out: &mut Emitter<'_>) {
        let program = if self.stage < MODE_STAGE {
            PRESETS[self.selection_index].program
        } else {
            SETTINGS[self.selection_index].display_program
        };
        out.preview(program);
    }
}
