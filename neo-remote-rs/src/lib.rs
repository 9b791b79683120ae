//! Control core for a one-switch MIDI foot remote.
//!
//! One footswitch, one two-position layer switch and up to two
//! potentiometers drive a downstream pitch/harmony unit through MIDI
//! Program Change and Control Change messages. This crate turns the noisy
//! switch samples into gestures, routes them through a two-layer UI and
//! runs one of seven performance engines that convert sustained presses
//! into timed MIDI sequences.
//!
//! # Architecture
//!
//! ```text
//! Panel (raw pins, pots)
//!   └─► DebouncedSwitch ─► GestureClassifier ─┬─► LayerController (settings menu)
//!                                            ├─► BootProgrammer  (slot/mode setup)
//!                                            └─► Engine           (Latch … Legacy)
//!                                                   └─► Effects (MIDI, pauses, relay routes)
//! ```
//!
//! Everything is owned by one [`Controller`]. The host calls
//! [`Controller::tick()`] in a loop with the current monotonic time and
//! executes the returned [`Effects`] in order. Nothing in the core blocks
//! or reads a timer on its own, so every behaviour is unit-testable with
//! synthetic clocks.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. All buffers are `heapless` collections with fixed
//! capacity. The optional `defmt` feature enables structured logging for
//! embedded targets.

#![no_std]

pub mod boot;
pub mod clock;
pub mod config;
pub mod controller;
pub mod effects;
mod engine;
pub mod error;
pub mod input;
pub mod io;
pub mod layer;
pub mod midi;
pub mod mode;
pub mod preset;
pub mod relay;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use clock::{Clock, Millis};
pub use config::{BypassScheme, Config, EffectBackend, LayerSwitchMode, TimeRange};
pub use controller::Controller;
pub use effects::{Effect, Effects, Route};
pub use engine::Direction;
pub use error::{ConfigError, PresetError, RelayError};
pub use io::{AnalogInput, DigitalInput, HalInput, MidiSink, Panel, RandomSource};
pub use layer::Layer;
pub use midi::MidiMessage;
pub use mode::Mode;
pub use preset::{ActiveSelection, PresetSlots, Slot};
pub use relay::RelayBypass;
