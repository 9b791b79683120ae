use super::{EngineCtx, PerformanceEngine};

/// Plain CC0 gate: 127 while the footswitch is down, 0 when it is up.
/// No program changes and no tap behavior.
pub(crate) struct Legacy {
    engaged: bool,
}

impl Legacy {
    pub(crate) fn new() -> Self {
        Self { engaged: false }
    }
}

impl PerformanceEngine for Legacy {
    fn on_press(&mut self, ctx: &mut EngineCtx<'_>) {
        self.engaged = true;
        ctx.out.arm(true);
    }

    fn on_release(&mut self, ctx: &mut EngineCtx<'_>) {
        self.disarm(ctx);
    }

    fn swaps_on_double_tap(&self, _crossed_hold: bool) -> bool {
        false
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        self.engaged = false;
        ctx.out.arm(false);
    }

    fn disarm(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.engaged {
            self.engaged = false;
            ctx.out.arm(false);
        }
    }

    fn is_idle(&self) -> bool {
        !self.engaged
    }
}
