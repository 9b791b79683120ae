//! The seven performance engines.
//!
//! Each engine owns its transient runner state and reacts to the same
//! small set of events. [`Engine`] is the single dispatch point: the
//! controller never branches on the mode to decide what an event does.

mod holding;
mod latch;
mod legacy;
mod momentary;
mod sequencer;
mod shutter;

pub(crate) use holding::Holding;
pub(crate) use latch::Latch;
pub(crate) use legacy::Legacy;
pub(crate) use momentary::Momentary;
pub use sequencer::Direction;
pub(crate) use sequencer::Sequencer;
pub(crate) use shutter::Shutter;

use crate::clock::Millis;
use crate::effects::Emitter;
use crate::io::RandomSource;
use crate::mode::Mode;
use crate::preset::ActiveSelection;

/// Everything an engine may read or emit during one event.
pub(crate) struct EngineCtx<'a> {
    pub now: Millis,
    /// Program of the active slot.
    pub program: u8,
    /// Time-pot duration mapped through the mode's range.
    pub time_ms: u32,
    /// Filtered shape-pot reading.
    pub shape: u16,
    pub selection: &'a mut ActiveSelection,
    pub out: Emitter<'a>,
    pub rng: &'a mut dyn RandomSource,
}

/// Common contract of the performance engines.
///
/// Only `baseline_apply`, `disarm` and `is_idle` are mandatory; the event
/// hooks default to doing nothing.
pub(crate) trait PerformanceEngine {
    /// Stable press on the Performance layer.
    fn on_press(&mut self, _ctx: &mut EngineCtx<'_>) {}

    /// The hold threshold was reached (once per press).
    fn on_hold_trigger(&mut self, _ctx: &mut EngineCtx<'_>) {}

    /// Called every tick on the Performance layer; fires due deadlines.
    fn on_step_due(&mut self, _ctx: &mut EngineCtx<'_>) {}

    /// Stable release on the Performance layer.
    fn on_release(&mut self, _ctx: &mut EngineCtx<'_>) {}

    /// A single tap, delivered after the double-tap window.
    fn on_tap(&mut self, _crossed_hold: bool, _ctx: &mut EngineCtx<'_>) {}

    /// Whether a double-tap should swap the active slot.
    fn swaps_on_double_tap(&self, crossed_hold: bool) -> bool {
        !crossed_hold
    }

    /// Reset to idle and emit the mode's resting state.
    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>);

    /// Stop any running output (emitting its off sequence) and go idle.
    fn disarm(&mut self, ctx: &mut EngineCtx<'_>);

    /// `true` when no runner state is live.
    fn is_idle(&self) -> bool;
}

/// The active engine, one variant per [`Mode`].
pub(crate) enum Engine {
    Latch(Latch),
    Momentary(Momentary),
    Holding(Holding),
    Shutter(Shutter),
    Harmony(Sequencer),
    StepSeq(Sequencer),
    Legacy(Legacy),
}

impl Engine {
    /// Fresh, idle engine for `mode`. StepSeq draws a new permutation.
    pub(crate) fn for_mode(mode: Mode, rng: &mut dyn RandomSource) -> Self {
        match mode {
            Mode::Latch => Engine::Latch(Latch),
            Mode::Momentary => Engine::Momentary(Momentary::new()),
            Mode::Holding => Engine::Holding(Holding::new()),
            Mode::Shutter => Engine::Shutter(Shutter::new()),
            Mode::Harmony => Engine::Harmony(Sequencer::harmony()),
            Mode::StepSeq => Engine::StepSeq(Sequencer::step_seq(rng)),
            Mode::Legacy => Engine::Legacy(Legacy::new()),
        }
    }

    pub(crate) fn mode(&self) -> Mode {
        match self {
            Engine::Latch(_) => Mode::Latch,
            Engine::Momentary(_) => Mode::Momentary,
            Engine::Holding(_) => Mode::Holding,
            Engine::Shutter(_) => Mode::Shutter,
            Engine::Harmony(_) => Mode::Harmony,
            Engine::StepSeq(_) => Mode::StepSeq,
            Engine::Legacy(_) => Mode::Legacy,
        }
    }

    pub(crate) fn runner(&mut self) -> &mut dyn PerformanceEngine {
        match self {
            Engine::Latch(e) => e,
            Engine::Momentary(e) => e,
            Engine::Holding(e) => e,
            Engine::Shutter(e) => e,
            Engine::Harmony(e) | Engine::StepSeq(e) => e,
            Engine::Legacy(e) => e,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        match self {
            Engine::Latch(e) => e.is_idle(),
            Engine::Momentary(e) => e.is_idle(),
            Engine::Holding(e) => e.is_idle(),
            Engine::Shutter(e) => e.is_idle(),
            Engine::Harmony(e) | Engine::StepSeq(e) => e.is_idle(),
            Engine::Legacy(e) => e.is_idle(),
        }
    }

    /// Current Harmony/StepSeq direction, if the engine has one.
    pub(crate) fn direction(&self) -> Option<Direction> {
        match self {
            Engine::Harmony(e) | Engine::StepSeq(e) => Some(e.direction()),
            _ => None,
        }
    }
}
