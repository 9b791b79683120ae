//! The owning controller and its tick loop.
//!
//! [`Controller`] holds every piece of mutable state: switch debouncers,
//! the gesture classifier, the layer and boot state machines, the preset
//! slots and the active engine. A host drives it with
//! [`startup()`](Controller::startup) once and [`tick()`](Controller::tick)
//! in a loop, executing the returned [`Effects`] in order.
//!
//! # Tick order
//!
//! 1. Pot sampling (time and shape, each rate-limited)
//! 2. Deferred actions: mute-window expiry, pending single tap
//! 3. Layer switch debounce and transition
//! 4. Hold / long-hold evaluation
//! 5. Engine step (holding auto-off, shutter toggle, sequencer step)
//! 6. Footswitch debounce, press / release handling
//! 7. Settings-layer scan
//! 8. Boot scan

use crate::boot::BootProgrammer;
use crate::clock::{deadline_after, is_due, Millis};
use crate::config::Config;
use crate::effects::{Effects, Emitter};
use crate::engine::{Direction, Engine, EngineCtx, PerformanceEngine};
use crate::error::ConfigError;
use crate::input::{map_u16_expo, DebouncedSwitch, Gesture, GestureClassifier, PotSampler};
use crate::io::{Panel, RandomSource};
use crate::layer::{Layer, LayerController};
use crate::mode::Mode;
use crate::preset::{ActiveSelection, PresetSlots};

/// Single owner of all remote state.
///
/// # Example
///
/// ```
/// use neo_remote::{AnalogInput, Config, Controller, DigitalInput, Panel};
///
/// struct Pin(bool);
/// impl DigitalInput for Pin {
///     fn read(&mut self) -> bool { self.0 }
/// }
/// struct Pot(u16);
/// impl AnalogInput for Pot {
///     fn read_u16(&mut self) -> u16 { self.0 }
/// }
///
/// let rng = fastrand::Rng::with_seed(1);
/// let mut remote = Controller::new(Config::default(), rng, 0).unwrap();
/// let _intro = remote.startup(0);
///
/// let (mut foot, mut layer) = (Pin(true), Pin(true));
/// let (mut time, mut shape) = (Pot(32768), Pot(0));
/// let mut panel = Panel {
///     footswitch: &mut foot,
///     layer_switch: &mut layer,
///     time_pot: &mut time,
///     shape_pot: &mut shape,
/// };
/// let effects = remote.tick(10_000, &mut panel);
/// assert!(remote.is_programming());
/// assert_eq!(effects.dropped(), 0);
/// ```
pub struct Controller<R: RandomSource> {
    cfg: Config,
    rng: R,

    footswitch: DebouncedSwitch,
    layer_switch: DebouncedSwitch,
    switches_primed: bool,
    gestures: GestureClassifier,
    time_pot: PotSampler,
    shape_pot: PotSampler,

    layers: LayerController,
    boot: BootProgrammer,
    slots: PresetSlots,
    selection: ActiveSelection,
    engine: Engine,

    /// Preset-switch mute; the baseline is re-applied when it expires.
    mute_until: Option<Millis>,
}

impl<R: RandomSource> Controller<R> {
    /// Validate `cfg` and build a controller at boot stage 0.
    pub fn new(cfg: Config, mut rng: R, now: Millis) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let engine = Engine::for_mode(Mode::Latch, &mut rng);
        Ok(Self {
            footswitch: DebouncedSwitch::new(false, now, cfg.debounce_ms),
            layer_switch: DebouncedSwitch::new(false, now, cfg.debounce_ms),
            switches_primed: false,
            gestures: GestureClassifier::new(),
            time_pot: PotSampler::new(cfg.pot_read_interval_ms, cfg.pot_filter),
            shape_pot: PotSampler::new(cfg.shape_read_interval_ms, cfg.pot_filter),
            layers: LayerController::new(cfg.layer_mode),
            boot: BootProgrammer::new(now),
            slots: PresetSlots::new(),
            selection: ActiveSelection::default(),
            engine,
            mute_until: None,
            cfg,
            rng,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Walk direction of the Harmony/StepSeq engine, `None` in other modes.
    pub fn direction(&self) -> Option<Direction> {
        self.engine.direction()
    }

    pub fn slots(&self) -> &PresetSlots {
        &self.slots
    }

    pub fn selection(&self) -> &ActiveSelection {
        &self.selection
    }

    pub fn layer(&self) -> Layer {
        self.layers.layer()
    }

    pub fn layers(&self) -> &LayerController {
        &self.layers
    }

    pub fn boot(&self) -> &BootProgrammer {
        &self.boot
    }

    /// `true` during initial boot programming or a reprogram.
    pub fn is_programming(&self) -> bool {
        !self.boot.is_done()
    }

    /// `true` when the active engine has no live runner state.
    pub fn engine_idle(&self) -> bool {
        self.engine.is_idle()
    }

    /// `true` while a preset-switch mute is pending.
    pub fn is_muted(&self) -> bool {
        self.mute_until.is_some()
    }

    /// Filtered time-pot duration for the active mode.
    pub fn time_ms(&self) -> u32 {
        mapped_time(self.engine.mode(), &self.cfg, &self.time_pot)
    }

    // ── Host entry points ────────────────────────────────────────────

    /// Power-on sequence: optional animation, CC0 off, first boot item.
    ///
    /// The boot scan interval starts after the animation's pauses.
    pub fn startup(&mut self, now: Millis) -> Effects {
        let mut fx = Effects::new();
        let mut out = Emitter::new(&mut fx, &self.cfg);
        if self.cfg.startup_animation {
            out.startup_animation();
        }
        out.arm(false);
        let shown_at = deadline_after(now, fx.pause_ms());

        let mut out = Emitter::new(&mut fx, &self.cfg);
        self.boot
            .begin_stage(shown_at, &self.slots, self.engine.mode(), &mut out);
        fx
    }

    /// Run one scheduler iteration at `now`.
    pub fn tick(&mut self, now: Millis, panel: &mut Panel<'_>) -> Effects {
        let mut fx = Effects::new();

        self.time_pot.poll(now, &mut *panel.time_pot);
        self.shape_pot.poll(now, &mut *panel.shape_pot);

        // Active-low: a low pin is a pressed footswitch / engaged layer switch.
        let foot_down = !panel.footswitch.read();
        let layer_engaged = !panel.layer_switch.read();
        if !self.switches_primed {
            self.footswitch = DebouncedSwitch::new(foot_down, now, self.cfg.debounce_ms);
            self.layer_switch = DebouncedSwitch::new(layer_engaged, now, self.cfg.debounce_ms);
            self.switches_primed = true;
        }

        self.poll_deferred(now, &mut fx);

        if let Some(engaged) = self.layer_switch.update(layer_engaged, now) {
            self.on_layer_switch(now, engaged, &mut fx);
        }

        self.poll_holds(now, &mut fx);

        if self.engine_live() {
            self.with_engine(now, &mut fx, |e, ctx| e.on_step_due(ctx));
        }

        match self.footswitch.update(foot_down, now) {
            Some(true) => self.on_press(now, &mut fx),
            Some(false) => self.on_release(now, &mut fx),
            None => {}
        }

        let interval = self.cfg.scan_interval_ms;
        if self.boot.is_done() {
            self.layers
                .poll_scan(now, interval, &mut Emitter::new(&mut fx, &self.cfg));
        } else {
            self.boot
                .poll_scan(now, interval, &mut Emitter::new(&mut fx, &self.cfg));
        }

        fx
    }

    /// Select `mode` as if applied from the Settings layer (no blink).
    pub fn apply_mode(&mut self, now: Millis, mode: Mode) -> Effects {
        let mut fx = Effects::new();
        self.switch_mode(now, mode, &mut fx);
        fx
    }

    // ── Deferred actions ─────────────────────────────────────────────

    fn poll_deferred(&mut self, now: Millis, fx: &mut Effects) {
        if let Some(until) = self.mute_until {
            if is_due(now, until) {
                self.mute_until = None;
                if self.boot.is_done() && self.layers.layer() == Layer::Performance {
                    self.with_engine(now, fx, |e, ctx| e.baseline_apply(ctx));
                }
            }
        }

        if let Some(Gesture::Tap { crossed_hold }) = self.gestures.take_pending_tap(now, &self.cfg) {
            self.on_tap(now, crossed_hold, fx);
        }
    }

    fn on_tap(&mut self, now: Millis, crossed_hold: bool, fx: &mut Effects) {
        if !self.boot.is_done() {
            return;
        }
        match self.layers.layer() {
            Layer::Performance => {
                self.with_engine(now, fx, |e, ctx| e.on_tap(crossed_hold, ctx));
            }
            Layer::Settings => {
                if let Some(mode) = self.layers.take_frozen() {
                    Emitter::new(fx, &self.cfg).blink(self.cfg.blink.times);
                    self.layers.exit_settings();
                    self.switch_mode(now, mode, fx);
                }
            }
        }
    }

    // ── Layer switch ─────────────────────────────────────────────────

    fn on_layer_switch(&mut self, now: Millis, engaged: bool, fx: &mut Effects) {
        let aborted = self.boot.is_reprogramming();
        if !self.boot.is_done() {
            if !aborted {
                return;
            }
            self.boot.abort();
        }
        self.gestures.cancel_pending();

        match self.layers.target_for(engaged) {
            Some(Layer::Settings) => self.enter_settings(now, fx),
            Some(Layer::Performance) => {
                self.layers.exit_settings();
                self.with_engine(now, fx, |e, ctx| e.baseline_apply(ctx));
            }
            // Still on Settings after an abort: refresh the menu.
            None if aborted => self.enter_settings(now, fx),
            None => {}
        }
    }

    fn enter_settings(&mut self, now: Millis, fx: &mut Effects) {
        self.mute_until = None;
        self.with_engine(now, fx, |e, ctx| e.disarm(ctx));
        self.layers
            .enter_settings(now, &mut Emitter::new(fx, &self.cfg));
    }

    // ── Holds ────────────────────────────────────────────────────────

    fn poll_holds(&mut self, now: Millis, fx: &mut Effects) {
        if !self.boot.is_done() {
            return;
        }
        match self.layers.layer() {
            Layer::Performance => {
                // A press carried over from Settings never reaches the engine.
                if self.gestures.press_layer() != Layer::Performance {
                    return;
                }
                if self.mute_until.is_none() && self.gestures.take_hold(now, &self.cfg).is_some() {
                    self.with_engine(now, fx, |e, ctx| e.on_hold_trigger(ctx));
                }
            }
            Layer::Settings => {
                if self
                    .gestures
                    .take_long_hold(now, Layer::Settings, &self.cfg)
                    .is_some()
                {
                    self.start_reprogram(now, fx);
                }
            }
        }
    }

    fn start_reprogram(&mut self, now: Millis, fx: &mut Effects) {
        self.gestures.cancel_pending();
        self.layers.resume(now);
        let mut out = Emitter::new(fx, &self.cfg);
        out.blink(self.cfg.blink.times);
        self.boot
            .restart_for_reprogram(now, &self.slots, self.engine.mode(), &mut out);
    }

    // ── Footswitch ───────────────────────────────────────────────────

    fn on_press(&mut self, now: Millis, fx: &mut Effects) {
        let layer = self.layers.layer();
        self.gestures.press(now, layer);

        if !self.boot.is_done() {
            self.boot
                .on_press(&mut self.slots, &mut Emitter::new(fx, &self.cfg));
            return;
        }
        match layer {
            Layer::Performance if self.mute_until.is_none() => {
                self.with_engine(now, fx, |e, ctx| e.on_press(ctx));
            }
            Layer::Performance => {}
            Layer::Settings => self.layers.freeze(),
        }
    }

    fn on_release(&mut self, now: Millis, fx: &mut Effects) {
        let (_, class) = self.gestures.release(now, &self.cfg);

        if !self.boot.is_done() {
            self.gestures.cancel_pending();
            let finished = self
                .boot
                .on_release(now, &mut self.slots, &mut Emitter::new(fx, &self.cfg));
            if let Some(mode) = finished {
                self.finish_programming(now, mode, fx);
            }
            return;
        }

        let layer = self.layers.layer();
        if self.gestures.press_layer() != layer {
            self.gestures.cancel_pending();
            return;
        }

        match layer {
            Layer::Performance => {
                self.with_engine(now, fx, |e, ctx| e.on_release(ctx));
                if let Some(Gesture::DoubleTap { crossed_hold }) = class {
                    self.on_double_tap(now, crossed_hold, fx);
                }
            }
            Layer::Settings => {
                let awaiting_tap = class.is_none() && self.gestures.has_pending_tap();
                if !awaiting_tap {
                    self.layers.resume(now);
                }
            }
        }
    }

    fn on_double_tap(&mut self, now: Millis, crossed_hold: bool, fx: &mut Effects) {
        let wanted = self.engine.runner().swaps_on_double_tap(crossed_hold);
        if wanted && self.engine.mode().allows_preset_switch() {
            self.switch_preset(now, fx);
        }
    }

    /// Swap the active slot: silence now, re-apply after the mute window.
    fn switch_preset(&mut self, now: Millis, fx: &mut Effects) {
        if !self.slots.both_assigned() {
            return;
        }
        self.with_engine(now, fx, |e, ctx| {
            if e.is_idle() {
                ctx.out.effect_off(ctx.program);
            } else {
                e.disarm(ctx);
            }
        });
        self.selection.active_slot = self.selection.active_slot.other();
        self.mute_until = Some(deadline_after(now, self.cfg.switch_mute_ms));
        #[cfg(feature = "defmt")]
        defmt::info!("active slot -> {}", self.selection.active_slot);
    }

    // ── Mode / programming ───────────────────────────────────────────

    /// Disarm the old engine, then start a fresh one at its baseline.
    fn switch_mode(&mut self, now: Millis, mode: Mode, fx: &mut Effects) {
        self.with_engine(now, fx, |e, ctx| e.disarm(ctx));
        self.mute_until = None;
        self.engine = Engine::for_mode(mode, &mut self.rng);
        self.with_engine(now, fx, |e, ctx| e.baseline_apply(ctx));
        #[cfg(feature = "defmt")]
        defmt::info!("mode -> {}", mode);
    }

    fn finish_programming(&mut self, now: Millis, mode: Mode, fx: &mut Effects) {
        if self.layers.layer() == Layer::Settings {
            self.layers.exit_settings();
        }
        self.selection = ActiveSelection::default();
        self.switch_mode(now, mode, fx);
    }

    // ── Engine plumbing ──────────────────────────────────────────────

    /// The engine receives events only on the Performance layer after
    /// programming and outside the mute window.
    fn engine_live(&self) -> bool {
        self.boot.is_done() && self.layers.layer() == Layer::Performance && self.mute_until.is_none()
    }

    fn with_engine<T>(
        &mut self,
        now: Millis,
        fx: &mut Effects,
        f: impl FnOnce(&mut dyn PerformanceEngine, &mut EngineCtx<'_>) -> T,
    ) -> T {
        let Self {
            cfg,
            rng,
            engine,
            selection,
            slots,
            time_pot,
            shape_pot,
            ..
        } = self;
        let mut ctx = EngineCtx {
            now,
            program: slots.program(selection.active_slot),
            time_ms: mapped_time(engine.mode(), cfg, time_pot),
            shape: shape_pot.value(),
            selection,
            out: Emitter::new(fx, cfg),
            rng,
        };
        f(engine.runner(), &mut ctx)
    }
}

fn mapped_time(mode: Mode, cfg: &Config, pot: &PotSampler) -> u32 {
    mode.time_range(cfg)
        .map_or(cfg.fixed_time_ms, |range| map_u16_expo(pot.value(), range))
}
