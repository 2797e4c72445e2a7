//! GPIO relay lines and the reservoir float switch.
//!
//! Both are thin wrappers over `embedded_hal` pin traits, so the board
//! build hands in `PinDriver`s and tests hand in recording pins.
//!
//! ## Wiring
//!
//! The relay board is active-low: driving the line LOW closes the
//! contact.  The float switch reads HIGH when the water is below the
//! pump intake.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{LevelSensor, RelayDriver};
use crate::error::{ActuatorError, SensorError};

pub struct GpioRelay<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Wrap `pin` and drive it to the released (off) level immediately.
    pub fn new(mut pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let off = if active_low { pin.set_high() } else { pin.set_low() };
        off.map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self { pin, active_low })
    }
}

impl<P: OutputPin> RelayDriver for GpioRelay<P> {
    fn drive(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let r = if high { self.pin.set_high() } else { self.pin.set_low() };
        r.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

pub struct GpioLevel<P> {
    pin: P,
}

impl<P: InputPin> GpioLevel<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> LevelSensor for GpioLevel<P> {
    fn is_low(&mut self) -> Result<bool, SensorError> {
        self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)
    }
}
