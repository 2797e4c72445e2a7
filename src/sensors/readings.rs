//! Latest-value snapshot of every installed sensor.
//!
//! Written only by the acquisition task, which publishes a complete
//! snapshot at the end of each cycle; every other task reads it.  A value
//! of `None` means the sensor is not installed or its last read failed,
//! which is distinct from a genuine zero.

use heapless::Vec;

use crate::config::{MAX_PROBES, MAX_SOIL_CHANNELS};

/// Air temperature / relative humidity pair from the climate sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub temperature_c: f32,
    pub humidity_percent: f32,
}

/// One temperature probe slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReading {
    pub id: u8,
    pub celsius: Option<f32>,
}

/// Addressable sensor classes for [`SensorReadings::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorClass {
    Probe(u8),
    Light,
    AirTemperature,
    AirHumidity,
    Soil(u8),
    SoilAverage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReadings {
    pub probes: Vec<ProbeReading, MAX_PROBES>,
    pub light_lux: Option<f32>,
    pub climate: Option<Climate>,
    /// Moisture percent per ADC channel, index = channel.
    pub soil: Vec<Option<f32>, MAX_SOIL_CHANNELS>,
    /// Mean of the channels reading at least 1 %.
    pub soil_average: Option<f32>,
    /// Completed acquisition cycles since boot.
    pub cycle: u32,
}

impl SensorReadings {
    /// Empty snapshot with one absent slot per configured probe and channel.
    pub fn with_layout(probe_ids: &[u8], soil_channels: u8) -> Self {
        let mut r = Self::default();
        for &id in probe_ids.iter().take(MAX_PROBES) {
            let _ = r.probes.push(ProbeReading { id, celsius: None });
        }
        for _ in 0..usize::from(soil_channels).min(MAX_SOIL_CHANNELS) {
            let _ = r.soil.push(None);
        }
        r
    }

    pub fn value(&self, class: SensorClass) -> Option<f32> {
        match class {
            SensorClass::Probe(id) => self.probes.iter().find(|p| p.id == id).and_then(|p| p.celsius),
            SensorClass::Light => self.light_lux,
            SensorClass::AirTemperature => self.climate.map(|c| c.temperature_c),
            SensorClass::AirHumidity => self.climate.map(|c| c.humidity_percent),
            SensorClass::Soil(ch) => self.soil.get(usize::from(ch)).copied().flatten(),
            SensorClass::SoilAverage => self.soil_average,
        }
    }

    /// `true` if any probe currently has a value.
    pub fn any_probe(&self) -> bool {
        self.probes.iter().any(|p| p.celsius.is_some())
    }
}
