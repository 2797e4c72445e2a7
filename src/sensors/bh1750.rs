//! BH1750 ambient light sensor (I2C).
//!
//! Runs in continuous high-resolution mode; a read returns the latest
//! completed conversion without waiting.

use embedded_hal::i2c::I2c;

use crate::app::ports::LightSensor;
use crate::error::SensorError;

/// ADDR pin low.
pub const DEFAULT_ADDRESS: u8 = 0x23;

const POWER_ON: u8 = 0x01;
const CONTINUOUS_HIGH_RES: u8 = 0x10;
/// Counts per lux at the default measurement time.
const COUNTS_PER_LUX: f32 = 1.2;

pub struct Bh1750<I> {
    bus: I,
    address: u8,
}

impl<I: I2c> Bh1750<I> {
    /// Power the sensor up and start continuous conversions.
    pub fn new(mut bus: I, address: u8) -> Result<Self, SensorError> {
        bus.write(address, &[POWER_ON]).map_err(|_| SensorError::ProbeNotFound)?;
        bus.write(address, &[CONTINUOUS_HIGH_RES])
            .map_err(|_| SensorError::BusFailed)?;
        Ok(Self { bus, address })
    }
}

impl<I: I2c> LightSensor for Bh1750<I> {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        let mut buf = [0u8; 2];
        self.bus.read(self.address, &mut buf).map_err(|_| SensorError::BusFailed)?;
        Ok(f32::from(u16::from_be_bytes(buf)) / COUNTS_PER_LUX)
    }
}
