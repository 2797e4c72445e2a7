//! ADS1115 four-channel ADC (I2C) behind the soil moisture probes.
//!
//! Each read is a single-shot conversion of one channel against ground,
//! full-scale ±6.144 V, 128 samples per second.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::SoilAdc;
use crate::error::SensorError;

/// ADDR pin to ground.
pub const DEFAULT_ADDRESS: u8 = 0x48;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const OS_START: u16 = 1 << 15;
const MUX_SINGLE_AIN0: u16 = 0b100 << 12;
const PGA_6V144: u16 = 0b000 << 9;
const MODE_SINGLE_SHOT: u16 = 1 << 8;
const DR_128SPS: u16 = 0b100 << 5;
const COMP_DISABLE: u16 = 0b11;

/// One conversion at 128 SPS plus margin.
const CONVERSION_MS: u32 = 9;

pub struct Ads1115<I, D> {
    bus: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Ads1115<I, D> {
    pub fn new(bus: I, delay: D, address: u8) -> Self {
        Self { bus, delay, address }
    }

    fn config_for(channel: u8) -> u16 {
        OS_START
            | (MUX_SINGLE_AIN0 + (u16::from(channel) << 12))
            | PGA_6V144
            | MODE_SINGLE_SHOT
            | DR_128SPS
            | COMP_DISABLE
    }
}

impl<I: I2c, D: DelayNs> SoilAdc for Ads1115<I, D> {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError> {
        if channel > 3 {
            return Err(SensorError::AdcReadFailed);
        }
        let [hi, lo] = Self::config_for(channel).to_be_bytes();
        self.bus
            .write(self.address, &[REG_CONFIG, hi, lo])
            .map_err(|_| SensorError::BusFailed)?;
        self.delay.delay_ms(CONVERSION_MS);
        let mut buf = [0u8; 2];
        self.bus
            .write_read(self.address, &[REG_CONVERSION], &mut buf)
            .map_err(|_| SensorError::AdcReadFailed)?;
        Ok(i16::from_be_bytes(buf))
    }
}
