use super::{EngineCtx, PerformanceEngine};
use crate::clock::{deadline_after, is_due, Millis};

/// Gate effect: alternates active and bypass at a pot-set half-period
/// while held. The arm control is sent only at start and stop.
pub(crate) struct Shutter {
    active: bool,
    phase_on: bool,
    next_toggle_at: Millis,
}

impl Shutter {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            phase_on: false,
            next_toggle_at: 0,
        }
    }
}

impl PerformanceEngine for Shutter {
    fn on_hold_trigger(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.active {
            return;
        }
        self.active = true;
        self.phase_on = true;
        ctx.out.effect_on(ctx.program);
        self.next_toggle_at = deadline_after(ctx.now, ctx.time_ms);
    }

    fn on_step_due(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.active && is_due(ctx.now, self.next_toggle_at) {
            self.phase_on = !self.phase_on;
            ctx.out.phase(ctx.program, self.phase_on);
            self.next_toggle_at = deadline_after(ctx.now, ctx.time_ms);
        }
    }

    fn on_release(&mut self, ctx: &mut EngineCtx<'_>) {
        self.disarm(ctx);
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        *self = Self::new();
        ctx.out.effect_off(ctx.program);
    }

    fn disarm(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.active {
            ctx.out.effect_off(ctx.program);
        }
        *self = Self::new();
    }

    fn is_idle(&self) -> bool {
        !self.active
    }
}
