//! Shared I2C bus.
//!
//! The light sensor, the climate sensor and the soil ADC sit on one I2C
//! bus but are owned by separate boxed sensor drivers.  The scheduler is
//! single-threaded and a driver never re-enters another, so each driver
//! gets an `embedded_hal_bus` `RefCellDevice` onto the same bus.

use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;

/// One driver's handle onto the shared bus.
pub type I2cRef<I> = RefCellDevice<'static, I>;

/// Park the bus for the life of the process.  Hand each driver its own
/// [`I2cRef`] via [`device`].
pub fn share<I: 'static>(bus: I) -> &'static RefCell<I> {
    Box::leak(Box::new(RefCell::new(bus)))
}

pub fn device<I>(bus: &'static RefCell<I>) -> I2cRef<I> {
    RefCellDevice::new(bus)
}
