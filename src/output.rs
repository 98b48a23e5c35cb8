//! The light output sink and a GPIO-backed implementation.

use crate::types::LightState;

/// Trait for abstracting traffic light hardware.
///
/// One sink is shared by every mode and every background worker, so `set`
/// takes `&self`; implementations synchronize internally. Each call writes
/// all three channels as one logical update and is expected to return
/// promptly. Hardware errors are handled internally; this method cannot fail.
pub trait LightOutput {
    /// Shows `lights` on the fixture.
    fn set(&self, lights: LightState);
}

impl<T: LightOutput + ?Sized> LightOutput for &T {
    fn set(&self, lights: LightState) {
        (**self).set(lights);
    }
}

#[cfg(feature = "std")]
impl<T: LightOutput + ?Sized> LightOutput for std::sync::Arc<T> {
    fn set(&self, lights: LightState) {
        (**self).set(lights);
    }
}

#[cfg(feature = "std")]
impl<T: LightOutput + ?Sized> LightOutput for std::boxed::Box<T> {
    fn set(&self, lights: LightState) {
        (**self).set(lights);
    }
}

#[cfg(feature = "std")]
pub use self::gpio::TrafficLight;

#[cfg(feature = "std")]
mod gpio {
    use std::sync::{Mutex, PoisonError};

    use embedded_hal::digital::{OutputPin, PinState};
    use tracing::error;

    use super::LightOutput;
    use crate::types::LightState;

    /// A traffic light wired to three digital output pins.
    ///
    /// The pins sit behind one lock so concurrent `set` calls never
    /// interleave their channel writes.
    pub struct TrafficLight<R, A, G> {
        pins: Mutex<Pins<R, A, G>>,
        active_low: bool,
    }

    struct Pins<R, A, G> {
        red: R,
        amber: A,
        green: G,
    }

    impl<R, A, G> TrafficLight<R, A, G>
    where
        R: OutputPin,
        A: OutputPin,
        G: OutputPin,
    {
        /// Creates a traffic light where a high pin lights the lamp.
        pub fn new(red: R, amber: A, green: G) -> Self {
            Self {
                pins: Mutex::new(Pins { red, amber, green }),
                active_low: false,
            }
        }

        /// Creates a traffic light where a low pin lights the lamp.
        pub fn active_low(red: R, amber: A, green: G) -> Self {
            Self {
                pins: Mutex::new(Pins { red, amber, green }),
                active_low: true,
            }
        }

        fn level(&self, lit: bool) -> PinState {
            PinState::from(lit != self.active_low)
        }

        /// Consumes the light, returning the pins.
        pub fn into_pins(self) -> (R, A, G) {
            let pins = self.pins.into_inner().unwrap_or_else(PoisonError::into_inner);
            (pins.red, pins.amber, pins.green)
        }
    }

    impl<R, A, G> LightOutput for TrafficLight<R, A, G>
    where
        R: OutputPin,
        A: OutputPin,
        G: OutputPin,
    {
        fn set(&self, lights: LightState) {
            let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);

            if let Err(err) = pins.red.set_state(self.level(lights.red())) {
                error!(?err, "failed to drive red channel");
            }
            if let Err(err) = pins.amber.set_state(self.level(lights.amber())) {
                error!(?err, "failed to drive amber channel");
            }
            if let Err(err) = pins.green.set_state(self.level(lights.green())) {
                error!(?err, "failed to drive green channel");
            }
        }
    }

}
