//! End-to-end runs of the controller against simulated switches and pots.
//!
//! Every test boots through the footswitch exactly as a player would, then
//! drives the panel one millisecond per tick.

use neo_remote::{
    AnalogInput, Config, Controller, DigitalInput, Direction, Effect, Layer, MidiMessage, Millis,
    Mode, Panel, RandomSource, Slot,
};

// ── Simulated hardware ───────────────────────────────────────────────────

struct Pin(bool);

impl DigitalInput for Pin {
    fn read(&mut self) -> bool {
        self.0
    }
}

struct Pot(u16);

impl AnalogInput for Pot {
    fn read_u16(&mut self) -> u16 {
        self.0
    }
}

/// Replays a fixed list of draws, wrapping around.
struct Script {
    draws: Vec<usize>,
    pos: usize,
}

impl RandomSource for Script {
    fn next_index(&mut self, bound: usize) -> usize {
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v % bound
    }
}

const CH: u8 = 3;
const DEBOUNCE: Millis = 30;

struct Bench {
    remote: Controller<Script>,
    now: Millis,
    foot: Pin,
    layer: Pin,
    time: Pot,
    shape: Pot,
    log: Vec<Effect>,
}

impl Bench {
    fn new(draws: &[usize]) -> Self {
        let cfg = Config {
            startup_animation: false,
            ..Config::default()
        };
        let rng = Script {
            draws: draws.to_vec(),
            pos: 0,
        };
        let mut remote = Controller::new(cfg, rng, 0).unwrap();
        remote.startup(0);
        Self {
            remote,
            now: 0,
            foot: Pin(true),
            layer: Pin(true),
            time: Pot(32768),
            shape: Pot(0),
            log: Vec::new(),
        }
    }

    fn step(&mut self) {
        self.now += 1;
        let mut panel = Panel {
            footswitch: &mut self.foot,
            layer_switch: &mut self.layer,
            time_pot: &mut self.time,
            shape_pot: &mut self.shape,
        };
        let fx = self.remote.tick(self.now, &mut panel);
        assert_eq!(fx.dropped(), 0);
        self.log.extend(fx.iter().copied());
    }

    fn run(&mut self, ms: u32) {
        for _ in 0..ms {
            self.step();
        }
    }

    fn run_until(&mut self, t: Millis) {
        while self.now < t {
            self.step();
        }
    }

    /// Hold the footswitch for `ms` ticks, then let go (not yet debounced).
    fn hold(&mut self, ms: u32) {
        self.foot.0 = false;
        self.run(ms);
        self.foot.0 = true;
    }

    /// A 100 ms press. Returns the debounced release time.
    fn commit(&mut self) -> Millis {
        let start = self.now;
        self.hold(100);
        self.run(100);
        start + 100 + DEBOUNCE + 1
    }

    fn set_layer(&mut self, engaged: bool) {
        self.layer.0 = !engaged;
        self.run(DEBOUNCE + 10);
    }

    fn take_log(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.log)
    }

    /// Program slot A, slot B and the mode by waiting for each on the scan.
    fn boot(&mut self, a: u32, b: u32, mode: Mode) {
        self.run_until(a * 1000 + 10);
        let stage1 = self.commit();
        self.run_until(stage1 + b * 1000 + 10);
        let stage2 = self.commit();
        self.run_until(stage2 + mode.setting_index() as u32 * 1000 + 10);
        self.commit();
        assert!(!self.remote.is_programming());
        assert_eq!(self.remote.mode(), mode);
        self.take_log();
    }
}

fn on(program: u8) -> [Effect; 2] {
    [
        Effect::Midi(MidiMessage::ControlChange {
            channel: CH,
            control: 0,
            value: 127,
        }),
        Effect::Midi(MidiMessage::ProgramChange {
            channel: CH,
            program,
        }),
    ]
}

fn off(program: u8) -> [Effect; 2] {
    [
        Effect::Midi(MidiMessage::ControlChange {
            channel: CH,
            control: 0,
            value: 0,
        }),
        Effect::Midi(MidiMessage::ProgramChange {
            channel: CH,
            program: program + 17,
        }),
    ]
}

fn programs(log: &[Effect]) -> Vec<u8> {
    log.iter()
        .filter_map(|e| match e {
            Effect::Midi(MidiMessage::ProgramChange { program, .. }) => Some(*program),
            _ => None,
        })
        .collect()
}

fn last_arm_value(log: &[Effect]) -> Option<u8> {
    log.iter().rev().find_map(|e| match e {
        Effect::Midi(MidiMessage::ControlChange {
            control: 0, value, ..
        }) => Some(*value),
        _ => None,
    })
}

// ── Boot ─────────────────────────────────────────────────────────────────

#[test]
fn boot_assigns_scanned_presets() {
    let mut bench = Bench::new(&[0]);
    bench.boot(3, 6, Mode::Holding);
    assert_eq!(bench.remote.slots().get(Slot::A), Some(3));
    assert_eq!(bench.remote.slots().get(Slot::B), Some(6));
    assert_eq!(bench.remote.layer(), Layer::Performance);
}

#[test]
fn reprogram_commits_only_after_stage_one() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Latch);

    bench.set_layer(true);
    let start = bench.now;
    bench.hold(2100);
    let long_hold_at = start + 1 + DEBOUNCE + 2000;
    assert!(bench.remote.is_programming());

    // Stage 0 starts on the old slot A (2); wait two steps for preset 4.
    bench.run_until(long_hold_at + 2000 + 10);
    let stage1 = bench.commit();
    assert_eq!(bench.remote.slots().get(Slot::A), Some(2));
    assert_eq!(bench.remote.boot().stage(), 1);

    // Stage 1 starts on the old slot B (5); take 6.
    bench.run_until(stage1 + 1000 + 10);
    bench.commit();
    assert_eq!(bench.remote.slots().get(Slot::A), Some(4));
    assert_eq!(bench.remote.slots().get(Slot::B), Some(6));
}

#[test]
fn interrupted_reprogram_keeps_slots() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Latch);
    let before = *bench.remote.slots();

    bench.set_layer(true);
    bench.hold(2100);
    bench.run(1100);
    bench.commit();
    assert_eq!(bench.remote.boot().stage(), 1);

    bench.set_layer(false);
    assert!(!bench.remote.is_programming());
    assert_eq!(*bench.remote.slots(), before);
    assert_eq!(bench.remote.mode(), Mode::Latch);
    assert_eq!(bench.remote.layer(), Layer::Performance);
}

// ── Holding ──────────────────────────────────────────────────────────────

#[test]
fn holding_turns_off_at_release_plus_pot_delay() {
    let mut bench = Bench::new(&[0]);
    bench.boot(3, 6, Mode::Holding);
    assert_eq!(bench.remote.time_ms(), 2179);

    let start = bench.now;
    bench.hold(800);
    assert_eq!(bench.take_log(), on(3));

    let released_at = start + 800 + DEBOUNCE + 1;
    bench.run_until(released_at + 2179 - 1);
    assert!(bench.take_log().is_empty());

    bench.step();
    assert_eq!(bench.take_log(), off(3));

    bench.run(3000);
    assert!(bench.take_log().is_empty());
    assert!(bench.remote.engine_idle());
}

// ── Latch ────────────────────────────────────────────────────────────────

#[test]
fn latch_double_tap_swaps_once() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Latch);

    bench.hold(80);
    bench.run(100);
    bench.hold(80);
    bench.run(DEBOUNCE + 10);
    assert_eq!(bench.remote.selection().active_slot, Slot::B);
    assert_eq!(bench.take_log(), off(2));

    bench.run(300);
    assert_eq!(bench.take_log(), on(5));

    // A later tap starts a new cycle: a single tap, so the effect toggles off.
    bench.hold(80);
    bench.run(500);
    assert_eq!(bench.remote.selection().active_slot, Slot::B);
    assert!(!bench.remote.selection().effect_enabled);
    assert_eq!(bench.take_log(), off(5));
}

// ── Harmony / StepSeq ────────────────────────────────────────────────────

#[test]
fn harmony_walks_down_then_disarms() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Harmony);
    let step = bench.remote.time_ms();
    assert_eq!(step, 424);

    bench.hold(DEBOUNCE + 500 + 2 * step + 5);
    let log = bench.take_log();
    assert_eq!(&log[..2], &on(15));
    assert_eq!(programs(&log), [15, 14, 13]);

    bench.run(100);
    let log = bench.take_log();
    assert_eq!(log, off(13));
}

#[test]
fn harmony_short_tap_cycles_direction() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Harmony);

    bench.hold(80);
    bench.run(500);
    let pulses = bench
        .take_log()
        .iter()
        .filter(|e| matches!(e, Effect::Midi(MidiMessage::NoteOn { velocity: 100, .. })))
        .count();
    assert_eq!(pulses, 2);
    assert_eq!(bench.remote.direction(), Some(Direction::Up));

    // Direction is now Up: the first program is the bottom of the pool.
    bench.hold(DEBOUNCE + 510);
    assert_eq!(programs(&bench.take_log()), [8]);
}

#[test]
fn step_seq_plays_a_permutation_of_the_pool() {
    let mut bench = Bench::new(&[5, 2, 7, 1, 3, 0, 6, 4]);
    bench.boot(2, 5, Mode::StepSeq);
    let step = bench.remote.time_ms();

    bench.hold(DEBOUNCE + 500 + 7 * step + 5);
    let mut seen = programs(&bench.take_log());
    assert_eq!(seen.len(), 8);
    let last = *seen.last().unwrap();
    seen.sort_unstable();
    assert_eq!(seen, [8, 9, 10, 11, 12, 13, 14, 15]);

    bench.run(100);
    assert_eq!(bench.take_log(), off(last));
}

// ── Mode isolation ───────────────────────────────────────────────────────

#[test]
fn mode_switch_leaves_nothing_armed() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Shutter);

    // Shutter running with the footswitch held, then flip to Settings.
    bench.foot.0 = false;
    bench.run(900);
    assert!(!bench.remote.engine_idle());
    bench.set_layer(true);
    assert!(bench.remote.engine_idle());
    assert_eq!(last_arm_value(&bench.log), Some(0));
    let entered = bench.now - 10;
    bench.foot.0 = true;
    bench.run(DEBOUNCE + 10);

    // Wait for the Harmony entry and tap it.
    bench.run_until(entered + 4 * 1000 + 10);
    bench.hold(100);
    bench.run(500);
    assert_eq!(bench.remote.mode(), Mode::Harmony);
    assert_eq!(bench.remote.layer(), Layer::Performance);
    assert!(bench.remote.engine_idle());
    assert_eq!(last_arm_value(&bench.log), Some(0));
}

// ── Presses that cross layers ───────────────────────────────────────────

/// Foot goes down on Settings and stays down after the layer switch
/// returns to Performance, long enough for any hold to trigger.
fn press_on_settings_release_on_performance(bench: &mut Bench) {
    bench.set_layer(true);
    bench.foot.0 = false;
    bench.run(100);
    bench.set_layer(false);
    assert_eq!(bench.remote.layer(), Layer::Performance);
    bench.run(1500);
    bench.foot.0 = true;
}

#[test]
fn momentary_ignores_a_press_started_on_settings() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Momentary);

    press_on_settings_release_on_performance(&mut bench);
    bench.run(2000);
    assert!(bench.remote.engine_idle());
    assert_eq!(last_arm_value(&bench.log), Some(0));
    assert!(!bench.take_log().contains(&on(2)[0]));
}

#[test]
fn shutter_ignores_a_press_started_on_settings() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Shutter);

    press_on_settings_release_on_performance(&mut bench);
    assert!(!bench.take_log().contains(&on(2)[0]));
    bench.run(2000);
    assert!(bench.remote.engine_idle());
    assert!(programs(&bench.take_log()).is_empty());
}

#[test]
fn shutter_held_through_a_settings_visit_stays_off() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Shutter);

    bench.foot.0 = false;
    bench.run(900);
    assert!(!bench.remote.engine_idle());
    bench.set_layer(true);
    bench.set_layer(false);
    assert!(bench.remote.engine_idle());
    assert_eq!(last_arm_value(&bench.log), Some(0));
    bench.take_log();

    // Still held on Performance: the hold already fired for this press.
    bench.run(1000);
    assert!(bench.take_log().is_empty());
    bench.foot.0 = true;
    bench.run(2000);
    assert!(bench.remote.engine_idle());
    assert!(bench.take_log().is_empty());
}

#[test]
fn legacy_sends_only_the_gate() {
    let mut bench = Bench::new(&[0]);
    bench.boot(2, 5, Mode::Legacy);

    bench.hold(80);
    bench.run(100);
    bench.hold(80);
    bench.run(500);
    let log = bench.take_log();
    assert!(programs(&log).is_empty());
    assert_eq!(log.len(), 4);
    assert_eq!(bench.remote.selection().active_slot, Slot::A);
}
