//! Sensor subsystem: the reading model, soil calibration, the I2C chip
//! drivers and the set of installed sensors.
//!
//! The acquisition task owns a [`SensorSet`] and produces a
//! [`SensorReadings`](readings::SensorReadings) snapshot each cycle that
//! gets published into the shared context.
//!
//! | Driver    | Port            | Bus         |
//! |-----------|-----------------|-------------|
//! | `bh1750`  | `LightSensor`   | I2C 0x23    |
//! | `sht3x`   | `ClimateSensor` | I2C 0x44    |
//! | `ads1115` | `SoilAdc`       | I2C 0x48    |
//! | `ds18b20` | `TemperatureBus`| one-wire    |
//!
//! The drivers are generic over `embedded_hal` traits.  The I2C chips
//! share one bus through [`bus::I2cRef`] handles.

pub mod ads1115;
pub mod bh1750;
pub mod bus;
pub mod ds18b20;
pub mod readings;
pub mod sht3x;
pub mod soil;

use crate::app::ports::{ClimateSensor, LightSensor, SoilAdc, TemperatureBus};

/// Every sensor driver that initialised successfully.  A peripheral that
/// failed at boot is `None` and its readings stay absent for the life of
/// the process.
#[derive(Default)]
pub struct SensorSet {
    pub temperature: Option<Box<dyn TemperatureBus>>,
    pub light: Option<Box<dyn LightSensor>>,
    pub climate: Option<Box<dyn ClimateSensor>>,
    pub soil: Option<Box<dyn SoilAdc>>,
}

impl SensorSet {
    /// Names of the installed sensors, for the boot log.
    pub fn installed(&self) -> heapless::Vec<&'static str, 4> {
        let mut v = heapless::Vec::new();
        let slots = [
            (self.temperature.is_some(), "temperature"),
            (self.light.is_some(), "light"),
            (self.climate.is_some(), "climate"),
            (self.soil.is_some(), "soil"),
        ];
        for (present, name) in slots {
            if present {
                let _ = v.push(name);
            }
        }
        v
    }
}
