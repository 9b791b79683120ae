//! MIDI message construction and bypass-program arithmetic.
//!
//! Pure functions only. Status bytes carry the channel in the low nibble;
//! data bytes are masked to 7 bits.

use heapless::Vec;

use crate::config::BypassScheme;

/// Control number used to arm (127) and disarm (0) the effect.
pub const ARM_CONTROL: u8 = 0;
/// CC value for "effect on".
pub const ARM_ON: u8 = 127;
/// CC value for "effect off".
pub const ARM_OFF: u8 = 0;
/// Distance between an active program and its bypass twin.
pub const BYPASS_OFFSET: u8 = 17;

const PROGRAM_CHANGE: u8 = 0xC0;
const CONTROL_CHANGE: u8 = 0xB0;
const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

/// One outbound MIDI channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiMessage {
    ProgramChange { channel: u8, program: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// True Note-Off status (0x80), velocity 0.
    NoteOff { channel: u8, note: u8 },
}

impl MidiMessage {
    /// Encode to wire bytes (2 for Program Change, 3 otherwise).
    ///
    /// ```
    /// use neo_remote::MidiMessage;
    ///
    /// let pc = MidiMessage::ProgramChange { channel: 3, program: 5 };
    /// assert_eq!(pc.to_bytes().as_slice(), &[0xC3, 5]);
    ///
    /// let cc = MidiMessage::ControlChange { channel: 3, control: 0, value: 127 };
    /// assert_eq!(cc.to_bytes().as_slice(), &[0xB3, 0, 127]);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8, 3> {
        let (bytes, len) = match *self {
            MidiMessage::ProgramChange { channel, program } => {
                ([PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F, 0], 2)
            }
            MidiMessage::ControlChange { channel, control, value } => {
                ([CONTROL_CHANGE | (channel & 0x0F), control & 0x7F, value & 0x7F], 3)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                ([NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F], 3)
            }
            MidiMessage::NoteOff { channel, note } => {
                ([NOTE_OFF | (channel & 0x0F), note & 0x7F, 0], 3)
            }
        };
        let mut out = Vec::new();
        // Capacity is 3 and no message exceeds it.
        let _ = out.extend_from_slice(&bytes[..len]);
        out
    }
}

pub fn program_change(channel: u8, program: u8) -> MidiMessage {
    MidiMessage::ProgramChange { channel, program }
}

pub fn control_change(channel: u8, control: u8, value: u8) -> MidiMessage {
    MidiMessage::ControlChange { channel, control, value }
}

/// CC0 = 127 (`true`) or CC0 = 0 (`false`).
pub fn arm(channel: u8, on: bool) -> MidiMessage {
    control_change(channel, ARM_CONTROL, if on { ARM_ON } else { ARM_OFF })
}

pub fn note_on(channel: u8, note: u8, velocity: u8) -> MidiMessage {
    MidiMessage::NoteOn { channel, note, velocity }
}

/// Note On with velocity 0, the form every receiver treats as note off.
pub fn note_release(channel: u8, note: u8) -> MidiMessage {
    MidiMessage::NoteOn { channel, note, velocity: 0 }
}

pub fn note_off(channel: u8, note: u8) -> MidiMessage {
    MidiMessage::NoteOff { channel, note }
}

/// The program representing `active`'s "off" state.
///
/// ```
/// use neo_remote::midi::bypass_program;
/// use neo_remote::BypassScheme;
///
/// assert_eq!(bypass_program(BypassScheme::Offset, 0), 17);
/// assert_eq!(bypass_program(BypassScheme::Offset, 120), 127);
/// assert_eq!(bypass_program(BypassScheme::Fixed(28), 5), 28);
/// ```
pub fn bypass_program(scheme: BypassScheme, active: u8) -> u8 {
    match scheme {
        BypassScheme::Offset => (active & 0x7F).saturating_add(BYPASS_OFFSET).min(127),
        BypassScheme::Fixed(program) => program & 0x7F,
    }
}
