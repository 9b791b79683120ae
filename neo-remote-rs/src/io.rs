//! Capability interfaces consumed by the core.
//!
//! Pin sampling, ADC conversion, UART transmission and random number
//! generation belong to the host. The controller only sees these traits,
//! bundled per tick in a [`Panel`].

use embedded_hal::digital::InputPin;

use crate::midi::MidiMessage;

/// A digital input sampled once per tick.
///
/// Returns the raw pin level. Switches are wired active-low with pull-ups,
/// so a pressed footswitch or an engaged layer switch reads `false`.
pub trait DigitalInput {
    fn read(&mut self) -> bool;
}

/// A 16-bit analog input (0..=65535).
pub trait AnalogInput {
    fn read_u16(&mut self) -> u16;
}

/// Raw MIDI byte transport (fire-and-forget).
pub trait MidiSink {
    fn write(&mut self, bytes: &[u8]);

    /// Encode and write one message.
    fn send(&mut self, msg: MidiMessage) {
        self.write(&msg.to_bytes());
    }
}

/// Uniform random index source for the step sequencer.
pub trait RandomSource {
    /// A value in `0..bound`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn next_index(&mut self, bound: usize) -> usize {
        self.usize(..bound)
    }
}

/// Adapts an `embedded-hal` input pin. A failed read reports the idle
/// (high) level so a glitching pin never looks pressed.
pub struct HalInput<P> {
    pin: P,
}

impl<P: InputPin> HalInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> DigitalInput for HalInput<P> {
    fn read(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("input pin read failed; treating as released");
                true
            }
        }
    }
}

/// Every input the controller samples during one tick.
pub struct Panel<'a> {
    pub footswitch: &'a mut dyn DigitalInput,
    pub layer_switch: &'a mut dyn DigitalInput,
    /// Time pot (hold delay, shutter rate, step interval).
    pub time_pot: &'a mut dyn AnalogInput,
    /// Shape pot (StepSeq mutation amount).
    pub shape_pot: &'a mut dyn AnalogInput,
}
