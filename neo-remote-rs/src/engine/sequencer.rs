use heapless::Vec;

use super::{EngineCtx, PerformanceEngine};
use crate::clock::{deadline_after, is_due, Millis};
use crate::io::RandomSource;
use crate::preset::HARMONY_POOL;

const POOL: usize = HARMONY_POOL.len();
/// Longest sequence: ping-pong without repeated endpoints.
const MAX_STEPS: usize = 2 * POOL - 2;
/// Upper bound of random swaps per step at full shape.
const MAX_SWAPS: u32 = 6;

/// Order in which Harmony and StepSeq walk their pool.
///
/// A short tap on the Performance layer cycles Down → Up → PingPong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Down,
    Up,
    PingPong,
}

impl Direction {
    pub fn next(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::PingPong,
            Direction::PingPong => Direction::Down,
        }
    }

    /// Blink pulses announcing this direction.
    pub fn blink_count(self) -> u8 {
        match self {
            Direction::Down => 1,
            Direction::Up => 2,
            Direction::PingPong => 3,
        }
    }
}

/// Steps through the harmony pool while held (Harmony and StepSeq).
///
/// StepSeq owns a random permutation of the pool and perturbs it before
/// every step by up to six pairwise swaps, scaled by the shape pot.
pub(crate) struct Sequencer {
    base: [u8; POOL],
    randomize: bool,
    active: bool,
    cursor: usize,
    next_step_at: Millis,
    last_program: u8,
    direction: Direction,
}

impl Sequencer {
    pub(crate) fn harmony() -> Self {
        Self {
            base: HARMONY_POOL,
            randomize: false,
            active: false,
            cursor: 0,
            next_step_at: 0,
            last_program: HARMONY_POOL[0],
            direction: Direction::Down,
        }
    }

    pub(crate) fn step_seq(rng: &mut dyn RandomSource) -> Self {
        let mut seq = Self::harmony();
        seq.randomize = true;
        shuffle(&mut seq.base, rng);
        seq
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Programs for the current base and direction.
    pub(crate) fn sequence(&self) -> Vec<u8, MAX_STEPS> {
        let mut steps = Vec::new();
        match self.direction {
            Direction::Up => steps.extend(self.base.iter().copied()),
            Direction::Down => steps.extend(self.base.iter().rev().copied()),
            Direction::PingPong => {
                steps.extend(self.base.iter().rev().copied());
                steps.extend(self.base[1..POOL - 1].iter().copied());
            }
        }
        steps
    }

    fn mutate(&mut self, shape: u16, rng: &mut dyn RandomSource) {
        let swaps = u32::from(shape) * MAX_SWAPS / 65536;
        for _ in 0..swaps {
            let i = rng.next_index(POOL);
            let j = rng.next_index(POOL);
            self.base.swap(i, j);
        }
    }

    fn stop(&mut self) {
        self.active = false;
        self.cursor = 0;
    }
}

/// Fisher-Yates shuffle driven by `rng`.
fn shuffle(items: &mut [u8], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

impl PerformanceEngine for Sequencer {
    fn on_hold_trigger(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.active {
            return;
        }
        let first = self.sequence()[0];
        self.active = true;
        self.cursor = 0;
        self.last_program = first;
        ctx.out.effect_on(first);
        self.next_step_at = deadline_after(ctx.now, ctx.time_ms);
    }

    fn on_step_due(&mut self, ctx: &mut EngineCtx<'_>) {
        if !self.active || !is_due(ctx.now, self.next_step_at) {
            return;
        }
        if self.randomize {
            self.mutate(ctx.shape, &mut *ctx.rng);
        }
        let steps = self.sequence();
        self.cursor = (self.cursor + 1) % steps.len();
        self.last_program = steps[self.cursor];
        ctx.out.pc(self.last_program);
        self.next_step_at = deadline_after(ctx.now, ctx.time_ms);
    }

    fn on_release(&mut self, ctx: &mut EngineCtx<'_>) {
        self.disarm(ctx);
    }

    fn on_tap(&mut self, crossed_hold: bool, ctx: &mut EngineCtx<'_>) {
        if crossed_hold {
            return;
        }
        self.direction = self.direction.next();
        ctx.out.blink(self.direction.blink_count());
        #[cfg(feature = "defmt")]
        defmt::info!("sequence direction {}", self.direction);
    }

    fn baseline_apply(&mut self, ctx: &mut EngineCtx<'_>) {
        self.stop();
        ctx.out.effect_off(ctx.program);
    }

    fn disarm(&mut self, ctx: &mut EngineCtx<'_>) {
        if self.active {
            ctx.out.effect_off(self.last_program);
        }
        self.stop();
    }

    fn is_idle(&self) -> bool {
        !self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::engine::testing::{Bench, Script};
    use crate::midi::{self, MidiMessage};

    fn with_direction(mut seq: Sequencer, direction: Direction) -> Sequencer {
        seq.direction = direction;
        seq
    }

    // ── Sequence construction ────────────────────────────────────────

    #[test]
    fn harmony_sequences() {
        let down = with_direction(Sequencer::harmony(), Direction::Down).sequence();
        let up = with_direction(Sequencer::harmony(), Direction::Up).sequence();
        let ping = with_direction(Sequencer::harmony(), Direction::PingPong).sequence();
        assert_eq!(down.as_slice(), &[15, 14, 13, 12, 11, 10, 9, 8]);
        assert_eq!(up.as_slice(), &[8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(
            ping.as_slice(),
            &[15, 14, 13, 12, 11, 10, 9, 8, 9, 10, 11, 12, 13, 14]
        );
    }

    #[test]
    fn step_seq_base_is_a_permutation() {
        let seq = Sequencer::step_seq(&mut Script::new(&[3, 0, 5, 1, 2, 6, 4]));
        let mut sorted = seq.base;
        sorted.sort_unstable();
        assert_eq!(sorted, HARMONY_POOL);
        assert_ne!(seq.base, HARMONY_POOL);
    }

    #[test]
    fn ping_pong_follows_permutation() {
        let mut seq = Sequencer::step_seq(&mut Script::new(&[3, 0, 5]));
        seq.direction = Direction::PingPong;
        let steps = seq.sequence();
        let b = seq.base;
        assert_eq!(steps.len(), 14);
        assert_eq!(steps[0], b[7]);
        assert_eq!(steps[7], b[0]);
        assert_eq!(steps[8], b[1]);
        assert_eq!(steps[13], b[6]);
    }

    // ── Mutation ─────────────────────────────────────────────────────

    #[test]
    fn swap_count_scales_with_shape() {
        let mut rng = Script::new(&[0, 1]);
        let mut seq = Sequencer::harmony();
        seq.mutate(10_000, &mut rng);
        assert_eq!(rng.pos, 0);
        seq.mutate(u16::MAX, &mut rng);
        assert_eq!(rng.pos, 2 * 5);
        seq.mutate(32768, &mut rng);
        assert_eq!(rng.pos, 2 * 5 + 2 * 3);
    }

    #[test]
    fn coinciding_draws_are_a_no_op() {
        let mut seq = Sequencer::harmony();
        seq.mutate(u16::MAX, &mut Script::new(&[4]));
        assert_eq!(seq.base, HARMONY_POOL);
    }

    // ── Running ──────────────────────────────────────────────────────

    #[test]
    fn harmony_steps_and_disarms_on_last_program() {
        let mut bench = Bench::new();
        let mut seq = Sequencer::harmony();
        let arm = bench.run(500, |ctx| seq.on_hold_trigger(ctx));
        assert_eq!(
            arm.as_slice(),
            &[
                Effect::Midi(midi::arm(3, true)),
                Effect::Midi(midi::program_change(3, 15)),
            ]
        );
        assert!(bench.run(599, |ctx| seq.on_step_due(ctx)).is_empty());
        let step = bench.run(600, |ctx| seq.on_step_due(ctx));
        assert_eq!(step.as_slice(), &[Effect::Midi(midi::program_change(3, 14))]);

        let stop = bench.run(650, |ctx| seq.on_release(ctx));
        assert_eq!(
            stop.as_slice(),
            &[
                Effect::Midi(midi::arm(3, false)),
                Effect::Midi(midi::program_change(3, 31)),
            ]
        );
        assert!(seq.is_idle());
    }

    #[test]
    fn cursor_wraps() {
        let mut bench = Bench::new();
        let mut seq = with_direction(Sequencer::harmony(), Direction::Up);
        bench.run(0, |ctx| seq.on_hold_trigger(ctx));
        let mut last = 0;
        for i in 1..=8u32 {
            let fx = bench.run(i * 100, |ctx| seq.on_step_due(ctx));
            let first = fx.midi().next().copied();
            if let Some(MidiMessage::ProgramChange { program, .. }) = first {
                last = program;
            }
        }
        assert_eq!(last, 8);
    }

    #[test]
    fn short_tap_cycles_direction_with_blink() {
        let mut bench = Bench::new();
        let mut seq = Sequencer::harmony();
        let fx = bench.run(0, |ctx| seq.on_tap(false, ctx));
        assert_eq!(seq.direction(), Direction::Up);
        let pulses = fx
            .midi()
            .filter(|m| matches!(m, MidiMessage::NoteOn { velocity: 100, .. }))
            .count();
        assert_eq!(pulses, 2);

        bench.run(0, |ctx| seq.on_tap(false, ctx));
        assert_eq!(seq.direction(), Direction::PingPong);
        bench.run(0, |ctx| seq.on_tap(false, ctx));
        assert_eq!(seq.direction(), Direction::Down);
    }

    #[test]
    fn tap_after_hold_keeps_direction() {
        let mut bench = Bench::new();
        let mut seq = Sequencer::harmony();
        assert!(bench.run(0, |ctx| seq.on_tap(true, ctx)).is_empty());
        assert_eq!(seq.direction(), Direction::Down);
    }

    #[test]
    fn step_seq_mutates_before_each_step() {
        let mut bench = Bench::new();
        bench.shape = u16::MAX;
        bench.rng = Script::new(&[1, 2]);
        let mut seq = Sequencer::step_seq(&mut Script::new(&[0]));
        let before = seq.base;
        bench.run(0, |ctx| seq.on_hold_trigger(ctx));
        assert_eq!(bench.rng.pos, 0);
        bench.run(100, |ctx| seq.on_step_due(ctx));
        assert_eq!(bench.rng.pos, 10);
        assert_ne!(seq.base, before);
    }
}
