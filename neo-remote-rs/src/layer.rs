//! UI layers and the settings menu.
//!
//! The Performance layer is the default. The Settings layer auto-scrolls
//! through the [`SETTINGS`] catalog, previewing each entry as a bypass
//! program. A press freezes the scan on the current entry; the tap that
//! follows applies it, a double-tap drops it and resumes scanning.

use crate::clock::{elapsed, Millis};
use crate::config::LayerSwitchMode;
use crate::effects::Emitter;
use crate::mode::{Mode, SETTINGS, SETTINGS_COUNT};

/// The two UI contexts the footswitch operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Performance,
    Settings,
}

/// Active layer plus the settings-menu scan state.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerController {
    layer: Layer,
    switch_mode: LayerSwitchMode,
    selection_index: usize,
    frozen: Option<usize>,
    scan_paused: bool,
    last_step_at: Millis,
}

impl LayerController {
    pub fn new(switch_mode: LayerSwitchMode) -> Self {
        Self {
            layer: Layer::Performance,
            switch_mode,
            selection_index: 0,
            frozen: None,
            scan_paused: false,
            last_step_at: 0,
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Entry currently shown by the scan.
    pub fn selection_index(&self) -> usize {
        self.selection_index
    }

    pub fn is_scan_paused(&self) -> bool {
        self.scan_paused
    }

    /// Mode frozen by the last press, waiting for its tap.
    pub fn frozen_mode(&self) -> Option<Mode> {
        self.frozen.map(|i| SETTINGS[i].mode)
    }

    /// Layer requested by a stable layer-switch transition to `engaged`.
    ///
    /// Returns `None` if the transition does not change the layer.
    ///
    /// ```
    /// use neo_remote::layer::LayerController;
    /// use neo_remote::{Layer, LayerSwitchMode};
    ///
    /// let level = LayerController::new(LayerSwitchMode::Level);
    /// assert_eq!(level.target_for(true), Some(Layer::Settings));
    /// assert_eq!(level.target_for(false), None);
    ///
    /// let toggle = LayerController::new(LayerSwitchMode::Toggle);
    /// assert_eq!(toggle.target_for(false), Some(Layer::Settings));
    /// ```
    pub fn target_for(&self, engaged: bool) -> Option<Layer> {
        let target = match self.switch_mode {
            LayerSwitchMode::Level if engaged => Layer::Settings,
            LayerSwitchMode::Level => Layer::Performance,
            LayerSwitchMode::Toggle => match self.layer {
                Layer::Performance => Layer::Settings,
                Layer::Settings => Layer::Performance,
            },
        };
        (target != self.layer).then_some(target)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Switch to the Settings layer and show the first catalog entry.
    pub(crate) fn enter_settings(&mut self, now: Millis, out: &mut Emitter<'_>) {
        self.layer = Layer::Settings;
        self.selection_index = 0;
        self.frozen = None;
        self.scan_paused = false;
        self.last_step_at = now;
        self.show(out);
        #[cfg(feature = "defmt")]
        defmt::info!("settings layer entered");
    }

    /// Return to the Performance layer. The caller re-applies the baseline.
    pub(crate) fn exit_settings(&mut self) {
        self.layer = Layer::Performance;
        self.frozen = None;
        self.scan_paused = false;
        #[cfg(feature = "defmt")]
        defmt::info!("performance layer entered");
    }

    // ── Menu ─────────────────────────────────────────────────────────

    /// Stable press on the Settings layer: freeze on the current entry.
    pub(crate) fn freeze(&mut self) {
        self.frozen = Some(self.selection_index);
        self.scan_paused = true;
    }

    /// Drop any frozen entry and restart the scan interval from `now`.
    pub(crate) fn resume(&mut self, now: Millis) {
        self.frozen = None;
        self.scan_paused = false;
        self.last_step_at = now;
    }

    /// Consume the frozen entry for a confirmed tap.
    pub(crate) fn take_frozen(&mut self) -> Option<Mode> {
        let mode = self.frozen_mode();
        self.frozen = None;
        mode
    }

    /// Advance the scan once per interval while not paused.
    pub(crate) fn poll_scan(&mut self, now: Millis, interval_ms: u32, out: &mut Emitter<'_>) {
        if self.layer != Layer::Settings || self.scan_paused {
            return;
        }
        if elapsed(self.last_step_at, now) >= interval_ms {
            self.selection_index = (self.selection_index + 1) % SETTINGS_COUNT;
            self.last_step_at = now;
            self.show(out);
        }
    }

    fn show(&self, out: &mut Emitter<'_>) {
        out.preview(SETTINGS[self.selection_index].display_program);
    }
}
