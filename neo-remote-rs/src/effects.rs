//! Outbound effects produced by one controller call.
//!
//! The core never touches the UART, a timer or a relay pin. Each call to
//! [`Controller::tick()`](crate::Controller::tick) returns an [`Effects`]
//! list that the host executes strictly in order:
//!
//! - [`Effect::Midi`]: write the encoded message to the MIDI sink.
//! - [`Effect::Pause`]: sleep without polling input (startup animation,
//!   preset-commit confirmation, channel blink).
//! - [`Effect::Route`]: drive the analog bypass relays
//!   ([`EffectBackend::Relay`] only).

use heapless::Vec;

use crate::config::{Config, EffectBackend};
use crate::midi::{self, MidiMessage};

/// Maximum effects per call. The startup animation is the largest burst.
pub const EFFECT_CAPACITY: usize = 192;

/// Audio path selected by the relay back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Signal goes through the effect unit.
    Wet,
    /// Signal bypasses the effect unit.
    Dry,
}

/// A single host action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    Midi(MidiMessage),
    /// Blocking pause in milliseconds.
    Pause(u16),
    Route(Route),
}

/// Ordered, fixed-capacity list of effects.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    items: Vec<Effect, EFFECT_CAPACITY>,
    dropped: usize,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect. When full, the effect is dropped and counted.
    pub fn push(&mut self, effect: Effect) {
        if self.items.push(effect).is_err() {
            self.dropped += 1;
            #[cfg(feature = "defmt")]
            defmt::warn!("effect buffer full, dropped {}", self.dropped);
        }
    }

    pub fn as_slice(&self) -> &[Effect] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Effect> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of effects lost to overflow.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Only the MIDI messages, in order.
    pub fn midi(&self) -> impl Iterator<Item = &MidiMessage> + '_ {
        self.items.iter().filter_map(|e| match e {
            Effect::Midi(m) => Some(m),
            _ => None,
        })
    }

    /// Total blocking time requested by [`Effect::Pause`] entries.
    pub fn pause_ms(&self) -> u32 {
        self.items
            .iter()
            .map(|e| match e {
                Effect::Pause(ms) => u32::from(*ms),
                _ => 0,
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a Effects {
    type Item = &'a Effect;
    type IntoIter = core::slice::Iter<'a, Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Order in which the startup animation shows programs (pass 1).
const STARTUP_ORDER: [u8; 17] = [0, 8, 1, 9, 2, 10, 3, 11, 4, 12, 5, 13, 6, 14, 7, 15, 16];
/// Order in which the startup animation shows programs (pass 2).
const STARTUP_ORDER_2: [u8; 17] = [16, 0, 15, 1, 14, 2, 13, 3, 12, 4, 11, 5, 10, 6, 9, 7, 8];

/// Builds effect sequences using the configured channel, bypass scheme
/// and back end.
pub(crate) struct Emitter<'a> {
    fx: &'a mut Effects,
    cfg: &'a Config,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(fx: &'a mut Effects, cfg: &'a Config) -> Self {
        Self { fx, cfg }
    }

    pub(crate) fn cfg(&self) -> &'a Config {
        self.cfg
    }

    // ── Primitives ───────────────────────────────────────────────────

    pub(crate) fn midi(&mut self, msg: MidiMessage) {
        self.fx.push(Effect::Midi(msg));
    }

    pub(crate) fn pause(&mut self, ms: u16) {
        if ms > 0 {
            self.fx.push(Effect::Pause(ms));
        }
    }

    pub(crate) fn route(&mut self, route: Route) {
        self.fx.push(Effect::Route(route));
    }

    pub(crate) fn pc(&mut self, program: u8) {
        self.midi(midi::program_change(self.cfg.channel, program));
    }

    pub(crate) fn arm(&mut self, on: bool) {
        self.midi(midi::arm(self.cfg.channel, on));
    }

    pub(crate) fn bypass_of(&self, program: u8) -> u8 {
        midi::bypass_program(self.cfg.bypass, program)
    }

    pub(crate) fn bypass_pc(&mut self, program: u8) {
        let bypass = self.bypass_of(program);
        self.pc(bypass);
    }

    // ── Engine on/off (back-end dependent) ───────────────────────────

    /// Arm the effect on `program`.
    pub(crate) fn effect_on(&mut self, program: u8) {
        match self.cfg.backend {
            EffectBackend::Midi => {
                self.arm(true);
                self.pc(program);
            }
            EffectBackend::Relay => {
                self.pc(program);
                self.route(Route::Wet);
            }
        }
    }

    /// Disarm the effect and leave `program`'s bypass selected.
    pub(crate) fn effect_off(&mut self, program: u8) {
        match self.cfg.backend {
            EffectBackend::Midi => {
                self.arm(false);
                self.bypass_pc(program);
            }
            EffectBackend::Relay => self.route(Route::Dry),
        }
    }

    /// One shutter phase, without re-sending the arm control.
    pub(crate) fn phase(&mut self, program: u8, on: bool) {
        match self.cfg.backend {
            EffectBackend::Midi if on => self.pc(program),
            EffectBackend::Midi => self.bypass_pc(program),
            EffectBackend::Relay => self.route(if on { Route::Wet } else { Route::Dry }),
        }
    }

    // ── Feedback sequences (always MIDI) ─────────────────────────────

    /// Show `program` on the unit without engaging it (CC0 off + bypass).
    pub(crate) fn preview(&mut self, program: u8) {
        self.arm(false);
        self.bypass_pc(program);
    }

    /// Flash the freshly committed preset and settle in its bypass.
    pub(crate) fn confirm_preset(&mut self, program: u8) {
        self.pc(program);
        self.pause(70);
        self.bypass_pc(program);
        self.pause(40);
        self.pc(program);
        self.pause(50);
        self.bypass_pc(program);
    }

    /// Pulse a note on the configured channel `times` times.
    pub(crate) fn blink(&mut self, times: u8) {
        let blink = self.cfg.blink;
        let channel = self.cfg.channel;
        self.note_release(blink.note);
        self.pause(blink.lead_in_ms);
        for _ in 0..times {
            self.midi(midi::note_on(channel, blink.note, blink.velocity));
            self.pause(blink.on_ms);
            self.note_release(blink.note);
            self.pause(blink.off_ms);
        }
    }

    fn note_release(&mut self, note: u8) {
        let channel = self.cfg.channel;
        self.midi(midi::note_release(channel, note));
        if self.cfg.blink.strict_note_off {
            self.midi(midi::note_off(channel, note));
        }
    }

    /// Power-on sweep over the catalog bypass programs.
    pub(crate) fn startup_animation(&mut self) {
        let step = self.cfg.startup_step_ms;
        let mut forward = true;
        self.arm(false);
        for order in [&STARTUP_ORDER, &STARTUP_ORDER_2] {
            for _ in 0..self.cfg.startup_passes {
                if forward {
                    for &program in order.iter() {
                        self.bypass_pc(program);
                        self.pause(step);
                    }
                } else {
                    for &program in order.iter().rev() {
                        self.bypass_pc(program);
                        self.pause(step);
                    }
                }
                forward = !forward;
            }
        }
        self.arm(false);
        self.bypass_pc(0);
    }
}
