use super::{EngineCtx, PerformanceEngine};

/// Tap toggles the active slot on and off. All state lives in the shared
/// [`ActiveSelection`](crate::ActiveSelection).
pub(crate) struct Latch;

impl PerformanceEngine for Latch {
    fn on_tap(&mut self, _crossed_hold: bool, ctx: &mut EngineCtx<'_>) {
        ctx.selection.effect_enabled = !ctx.selection.effect_enabled;
        self.baseline_apply(ctx);
    }

    fn swaps_on_double_tap(&self, _crossed_hold: bool) -> bool {
        true
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        if ctx.selection.effect_enabled {
            ctx.out.effect_on(ctx.program);
        } else {
            ctx.out.effect_off(ctx.program);
        }
    }

    fn disarm(&mut self, _ctx: &mut EngineCtx<'_>) {}

    fn is_idle(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::engine::testing::Bench;
    use crate::midi;

    #[test]
    fn baseline_follows_enabled_flag() {
        let mut bench = Bench::new();
        let fx = bench.run(0, |ctx| Latch.baseline_apply(ctx));
        assert_eq!(
            fx.as_slice(),
            &[
                Effect::Midi(midi::arm(3, true)),
                Effect::Midi(midi::program_change(3, 4)),
            ]
        );
    }

    #[test]
    fn tap_toggles() {
        let mut bench = Bench::new();
        let fx = bench.run(0, |ctx| Latch.on_tap(false, ctx));
        assert!(!bench.selection.effect_enabled);
        assert_eq!(
            fx.as_slice(),
            &[
                Effect::Midi(midi::arm(3, false)),
                Effect::Midi(midi::program_change(3, 21)),
            ]
        );
        bench.run(500, |ctx| Latch.on_tap(true, ctx));
        assert!(bench.selection.effect_enabled);
    }

    #[test]
    fn every_double_tap_swaps() {
        assert!(Latch.swaps_on_double_tap(true));
        assert!(Latch.swaps_on_double_tap(false));
    }
}
