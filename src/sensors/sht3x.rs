//! SHT3x temperature / relative humidity sensor (I2C).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::ClimateSensor;
use crate::error::SensorError;
use crate::sensors::readings::Climate;

/// ADDR pin low.
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Single shot, high repeatability, clock stretching enabled.
const MEASURE: [u8; 2] = [0x2C, 0x06];
const MEASURE_MS: u32 = 50;

pub struct Sht3x<I, D> {
    bus: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Sht3x<I, D> {
    pub fn new(bus: I, delay: D, address: u8) -> Self {
        Self { bus, delay, address }
    }
}

/// CRC-8, polynomial 0x31, initial value 0xFF.
fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
    }
    crc
}

fn word(chunk: &[u8]) -> Result<u16, SensorError> {
    if crc8(&chunk[..2]) != chunk[2] {
        return Err(SensorError::BusFailed);
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

impl<I: I2c, D: DelayNs> ClimateSensor for Sht3x<I, D> {
    fn read(&mut self) -> Result<Climate, SensorError> {
        self.bus.write(self.address, &MEASURE).map_err(|_| SensorError::BusFailed)?;
        self.delay.delay_ms(MEASURE_MS);
        let mut buf = [0u8; 6];
        self.bus.read(self.address, &mut buf).map_err(|_| SensorError::BusFailed)?;

        let t = f32::from(word(&buf[0..3])?);
        let h = f32::from(word(&buf[3..6])?);
        Ok(Climate {
            temperature_c: -45.0 + 175.0 * t / 65_535.0,
            humidity_percent: 100.0 * h / 65_535.0,
        })
    }
}
