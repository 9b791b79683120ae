use super::{EngineCtx, PerformanceEngine};
use crate::clock::{deadline_after, is_due, Millis};

/// Effect on at the hold threshold; off a pot-set delay after release.
///
/// Pressing again while the effect is still on cancels the pending off.
/// The next release re-arms it.
pub(crate) struct Holding {
    /// The hold trigger fired during the current press.
    armed: bool,
    engaged: bool,
    off_at: Option<Millis>,
    /// Engaged and still held; the off deadline starts at release.
    wait_for_release: bool,
}

impl Holding {
    pub(crate) fn new() -> Self {
        Self {
            armed: false,
            engaged: false,
            off_at: None,
            wait_for_release: false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl PerformanceEngine for Holding {
    fn on_press(&mut self, _ctx: &mut EngineCtx<'_>) {
        self.armed = false;
        if self.engaged {
            self.off_at = None;
            self.wait_for_release = true;
        }
    }

    fn on_hold_trigger(&mut self, ctx: &mut EngineCtx<'_>) {
        self.armed = true;
        if !self.engaged {
            self.engaged = true;
            self.wait_for_release = true;
            ctx.out.effect_on(ctx.program);
        }
    }

    fn on_step_due(&mut self, ctx: &mut EngineCtx<'_>) {
        if let Some(off_at) = self.off_at {
            if is_due(ctx.now, off_at) {
                self.reset();
                ctx.out.effect_off(ctx.program);
            }
        }
    }

    fn on_release(&mut self, ctx: &mut EngineCtx<'_>) {
        self.armed = false;
        if self.engaged && self.wait_for_release {
            self.wait_for_release = false;
            self.off_at = Some(deadline_after(ctx.now, ctx.time_ms));
        }
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        self.reset();
        ctx.out.effect_off(ctx.program);
    }

    fn disarm(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.engaged {
            ctx.out.effect_off(ctx.program);
        }
        self.reset();
    }

    fn is_idle(&self) -> bool {
        !self.engaged && !self.armed && self.off_at.is_none()
    }
}
