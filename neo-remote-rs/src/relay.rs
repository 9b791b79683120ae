//! Analog bypass relay pair for the [`EffectBackend::Relay`] back end.
//!
//! Leg A routes the signal through the effect, leg B through the dry
//! bypass. Exactly one leg conducts at rest (`B = !A`). Switching is
//! break-before-make: the leg being opened is released first, then after a
//! short gap the other leg closes, so the two paths are never joined.
//!
//! [`EffectBackend::Relay`]: crate::EffectBackend::Relay

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::effects::Route;
use crate::error::RelayError;

/// Driver for the A/B relay pair.
///
/// # Example
///
/// ```ignore
/// use neo_remote::{RelayBypass, Route};
///
/// // `a`, `b` are embedded-hal output pins, `delay` a DelayNs source
/// let mut relay = RelayBypass::new(a, b, delay, true, 20)?;
/// relay.set(Route::Wet)?;
/// ```
pub struct RelayBypass<A, B, D> {
    a: A,
    b: B,
    delay: D,
    invert_b: bool,
    gap_us: u32,
    route: Route,
}

impl<A, B, D> RelayBypass<A, B, D>
where
    A: OutputPin,
    B: OutputPin,
    D: DelayNs,
{
    /// Take the pins and drive the pair to [`Route::Dry`].
    ///
    /// # Arguments
    /// * `invert_b` - B leg is active-low
    /// * `gap_us` - pause between opening one leg and closing the other
    pub fn new(
        a: A,
        b: B,
        delay: D,
        invert_b: bool,
        gap_us: u32,
    ) -> Result<Self, RelayError<A::Error, B::Error>> {
        let mut relay = Self {
            a,
            b,
            delay,
            invert_b,
            gap_us,
            route: Route::Wet,
        };
        relay.set(Route::Dry)?;
        Ok(relay)
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Switch to `route`. Does nothing if already there.
    pub fn set(&mut self, route: Route) -> Result<(), RelayError<A::Error, B::Error>> {
        if route == self.route {
            return Ok(());
        }

        match route {
            Route::Wet => {
                self.write_b(false)?;
                self.gap();
                self.a.set_high().map_err(RelayError::PinA)?;
            }
            Route::Dry => {
                self.a.set_low().map_err(RelayError::PinA)?;
                self.gap();
                self.write_b(true)?;
            }
        }
        self.route = route;
        Ok(())
    }

    /// Give the pins and delay back.
    pub fn release(self) -> (A, B, D) {
        (self.a, self.b, self.delay)
    }

    fn write_b(&mut self, closed: bool) -> Result<(), RelayError<A::Error, B::Error>> {
        let high = closed != self.invert_b;
        let result = if high {
            self.b.set_high()
        } else {
            self.b.set_low()
        };
        result.map_err(RelayError::PinB)
    }

    fn gap(&mut self) {
        if self.gap_us > 0 {
            self.delay.delay_us(self.gap_us);
        }
    }
}
