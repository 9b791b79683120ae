//! neo-hw-interface
//!
//! Foot-remote firmware for the Raspberry Pi Pico 2. Ticks the
//! `neo-remote` controller once per millisecond with the footswitch, the
//! layer switch and both pots (converted only when the controller's read
//! interval asks for them), then executes the returned effects:
//!
//! 1. MIDI messages go out on UART0 at 31250 baud.
//! 2. Pauses sleep the loop (blink, preset confirmation, startup animation).
//! 3. Route changes drive the A/B bypass relays when the relay back end is
//!    selected.
//!
//! Effects run strictly in order and input is not polled during a pause.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, Blocking, UartTx};
use embassy_time::{Delay, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use neo_remote::{
    AnalogInput, Clock, Config, Controller, Effect, Effects, EffectBackend, HalInput, MidiSink,
    Millis, Panel, RelayBypass,
};

// ---------------------------------------------------------------------------
// Boot block
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

/// Standard MIDI DIN baud rate.
const MIDI_BAUD: u32 = 31_250;

/// Scheduler period.
const TICK_MS: u64 = 1;

/// The bypass relay driver on this board closes on a low B pin.
const RELAY_B_INVERT: bool = true;

// ---------------------------------------------------------------------------
// Host adapters
// ---------------------------------------------------------------------------

type Relay = RelayBypass<Output<'static>, Output<'static>, Delay>;

/// MIDI out on a blocking UART transmitter.
struct UartMidi {
    tx: UartTx<'static, UART0, Blocking>,
}

impl MidiSink for UartMidi {
    fn write(&mut self, bytes: &[u8]) {
        if self.tx.blocking_write(bytes).is_err() {
            warn!("MIDI write failed");
        }
    }
}

type SharedAdc = RefCell<Adc<'static, adc::Blocking>>;

/// One pot on the shared ADC. Converts on demand and scales the 12-bit
/// result to 16 bits; a failed conversion keeps the previous reading.
struct AdcPot<'a> {
    adc: &'a SharedAdc,
    ch: Channel<'static>,
    last: u16,
}

impl AnalogInput for AdcPot<'_> {
    fn read_u16(&mut self) -> u16 {
        match self.adc.borrow_mut().blocking_read(&mut self.ch) {
            Ok(raw) => self.last = raw << 4,
            Err(_) => warn!("ADC read failed"),
        }
        self.last
    }
}

/// Embassy time driver as the controller's clock.
struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> Millis {
        // Wraps after ~49 days.
        Instant::now().as_millis() as Millis
    }
}

/// Execute one effect list in order.
async fn execute(fx: &Effects, midi: &mut UartMidi, relay: &mut Option<Relay>) {
    if fx.dropped() > 0 {
        warn!("{} effects dropped this tick", fx.dropped());
    }
    for effect in fx.iter() {
        match *effect {
            Effect::Midi(msg) => midi.send(msg),
            Effect::Pause(ms) => Timer::after_millis(u64::from(ms)).await,
            Effect::Route(route) => match relay {
                Some(relay) => {
                    if let Err(e) = relay.set(route) {
                        error!("relay switch failed: {}", e);
                    }
                }
                None => warn!("route {} requested without relay back end", route),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("neo-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // MIDI_TX  → GP0   (p.PIN_0)   UART0, 31250 baud
    // RELAY_A  → GP2   (p.PIN_2)   effect leg
    // RELAY_B  → GP3   (p.PIN_3)   bypass leg
    // FOOT_SW  → GP4   (p.PIN_4)   active-low, pull-up enabled
    // LAYER_SW → GP14  (p.PIN_14)  active-low, pull-up enabled
    // POT_TIME → GP26  (ADC0)
    // POT_SHAPE → GP27 (ADC1)
    // ———————————————————————————————————————————————————————————————————————

    let cfg = Config::default();

    let mut uart_cfg = uart::Config::default();
    uart_cfg.baudrate = MIDI_BAUD;
    let mut midi = UartMidi {
        tx: UartTx::new_blocking(p.UART0, p.PIN_0, uart_cfg),
    };

    let mut foot = HalInput::new(Input::new(p.PIN_4, Pull::Up));
    let mut layer = HalInput::new(Input::new(p.PIN_14, Pull::Up));

    let adc: SharedAdc = RefCell::new(Adc::new_blocking(p.ADC, adc::Config::default()));
    let mut time_pot = AdcPot {
        adc: &adc,
        ch: Channel::new_pin(p.PIN_26, Pull::None),
        last: 0,
    };
    let mut shape_pot = AdcPot {
        adc: &adc,
        ch: Channel::new_pin(p.PIN_27, Pull::None),
        last: 0,
    };

    // Relay pins are only claimed by the relay back end.
    let mut relay = match cfg.backend {
        EffectBackend::Relay => {
            let a = Output::new(p.PIN_2, Level::Low);
            let b = Output::new(p.PIN_3, Level::Low);
            match RelayBypass::new(a, b, Delay, RELAY_B_INVERT, cfg.relay_gap_us) {
                Ok(relay) => Some(relay),
                Err(e) => {
                    error!("relay init failed: {}", e);
                    None
                }
            }
        }
        EffectBackend::Midi => None,
    };

    // —— Controller —————————————————————————————————————————————————————————

    // Seed from pot noise and boot timing.
    let seed = u64::from(time_pot.read_u16())
        ^ (u64::from(shape_pot.read_u16()) << 16)
        ^ Instant::now().as_ticks();
    let rng = fastrand::Rng::with_seed(seed);

    let clock = EmbassyClock;
    let mut remote = unwrap!(Controller::new(cfg, rng, clock.now_ms()));
    execute(&remote.startup(clock.now_ms()), &mut midi, &mut relay).await;
    info!("startup done, programming slot A");

    loop {
        let mut panel = Panel {
            footswitch: &mut foot,
            layer_switch: &mut layer,
            time_pot: &mut time_pot,
            shape_pot: &mut shape_pot,
        };

        let fx = remote.tick(clock.now_ms(), &mut panel);
        execute(&fx, &mut midi, &mut relay).await;

        Timer::after_millis(TICK_MS).await;
    }
}
