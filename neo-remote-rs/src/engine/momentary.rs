use super::{EngineCtx, PerformanceEngine};

/// Effect on while held. Engages at the hold threshold, or on the press
/// itself when `momentary_on_press` is set.
pub(crate) struct Momentary {
    engaged: bool,
}

impl Momentary {
    pub(crate) fn new() -> Self {
        Self { engaged: false }
    }

    fn engage(&mut self, ctx: &mut EngineCtx<'_>) {
        if !self.engaged {
            self.engaged = true;
            ctx.out.effect_on(ctx.program);
        }
    }
}

impl PerformanceEngine for Momentary {
    fn on_press(&mut self, ctx: &mut EngineCtx<'_>) {
        if ctx.out.cfg().momentary_on_press {
            self.engage(ctx);
        }
    }

    fn on_hold_trigger(&mut self, ctx: &mut EngineCtx<'_>) {
        self.engage(ctx);
    }

    fn on_release(&mut self, ctx: &mut EngineCtx<'_>) {
        self.disarm(ctx);
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        self.engaged = false;
        ctx.out.effect_off(ctx.program);
    }

    fn disarm(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.engaged {
            self.engaged = false;
            ctx.out.effect_off(ctx.program);
        }
    }

    fn is_idle(&self) -> bool {
        !self.engaged
    }
}
