//! Simulated peripherals for host runs.
//!
//! Every sensor produces a slow, deterministic waveform so a host run
//! exercises each relay rule within a few minutes: the soil dries out
//! until the pump would fire, the air humidity swings across the fan
//! threshold, and the float switch reports low water for a stretch.
//!
//! ```text
//!   soil %    ▁▂▃▄▅▆▇█▇▆▅▄▃▂▁   (period 40 reads)
//!   humidity  ▅▆▇█▇▆▅▄▃▄▅       (period 24 reads)
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use log::info;

use crate::app::ports::{ClimateSensor, CloudPort, LevelSensor, LightSensor, RelayDriver, SoilAdc, TemperatureBus};
use crate::error::{ActuatorError, CloudError, SensorError};
use crate::sensors::readings::Climate;
use crate::telemetry::TelemetryPayload;

/// Triangle wave in `0.0..=1.0` with the given period.
fn triangle(step: u32, period: u32) -> f32 {
    let period = period.max(2);
    let half = period / 2;
    let pos = step % period;
    let up = if pos <= half { pos } else { period - pos };
    up as f32 / half as f32
}

#[derive(Debug, Default)]
pub struct SimProbes {
    step: u32,
}

impl TemperatureBus for SimProbes {
    fn read_probe(&mut self, probe: u8) -> Result<f32, SensorError> {
        self.step = self.step.wrapping_add(1);
        Ok(18.0 + f32::from(probe) * 1.5 + 4.0 * triangle(self.step, 60))
    }
}

#[derive(Debug, Default)]
pub struct SimLight {
    step: u32,
}

impl LightSensor for SimLight {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.step = self.step.wrapping_add(1);
        Ok((1_200.0 * triangle(self.step, 80)).round())
    }
}

#[derive(Debug, Default)]
pub struct SimClimate {
    step: u32,
}

impl ClimateSensor for SimClimate {
    fn read(&mut self) -> Result<Climate, SensorError> {
        self.step = self.step.wrapping_add(1);
        Ok(Climate {
            temperature_c: 21.0 + 3.0 * triangle(self.step, 50),
            humidity_percent: 55.0 + 25.0 * triangle(self.step, 24),
        })
    }
}

/// Soil ADC whose raw counts sweep between the wet and dry calibration
/// points.  Channel 3 is left floating and reads near zero.
#[derive(Debug)]
pub struct SimSoil {
    step: u32,
    raw_wet: i16,
    raw_dry: i16,
}

impl SimSoil {
    pub fn new(raw_wet: i16, raw_dry: i16) -> Self {
        Self {
            step: 0,
            raw_wet,
            raw_dry,
        }
    }
}

impl SoilAdc for SimSoil {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError> {
        if channel > 3 {
            return Err(SensorError::AdcReadFailed);
        }
        if channel == 0 {
            self.step = self.step.wrapping_add(1);
        }
        if channel == 3 {
            return Ok(12);
        }
        let span = f32::from(self.raw_dry) - f32::from(self.raw_wet);
        let skew = f32::from(channel) * 0.05;
        let dryness = (triangle(self.step, 40) + skew).min(1.0);
        Ok((f32::from(self.raw_wet) + span * dryness) as i16)
    }
}

/// Float switch that reports low water for `low_for` of every `period`
/// samples.
#[derive(Debug)]
pub struct SimLevel {
    step: u32,
    period: u32,
    low_for: u32,
}

impl SimLevel {
    pub fn new(period: u32, low_for: u32) -> Self {
        Self {
            step: 0,
            period: period.max(1),
            low_for,
        }
    }
}

impl LevelSensor for SimLevel {
    fn is_low(&mut self) -> Result<bool, SensorError> {
        self.step = self.step.wrapping_add(1);
        Ok(self.step % self.period < self.low_for)
    }
}

/// Relay line that only logs.
#[derive(Debug)]
pub struct SimRelay {
    name: &'static str,
}

impl SimRelay {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl RelayDriver for SimRelay {
    fn drive(&mut self, on: bool) -> Result<(), ActuatorError> {
        info!("SIM   | {} line {}", self.name, if on { "CLOSED" } else { "OPEN" });
        Ok(())
    }
}

/// Cloud endpoint that logs each batch and always grants the pump.
#[derive(Debug, Default)]
pub struct SimCloud {
    pushes: u32,
}

impl CloudPort for SimCloud {
    fn push(&mut self, payload: &TelemetryPayload) -> Result<(), CloudError> {
        self.pushes += 1;
        info!("SIM   | push #{}: {}", self.pushes, payload.to_query());
        Ok(())
    }

    fn pull(&mut self, key: &str) -> Result<String, CloudError> {
        info!("SIM   | pull {}", key);
        Ok(String::from("1"))
    }
}

/// Autostart input.  Reads high (start permitted) unless `BOXMON_ABORT`
/// is set in the environment.
#[derive(Debug)]
pub struct SimPin {
    grounded: bool,
}

impl SimPin {
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("BOXMON_ABORT").is_some())
    }

    pub fn new(grounded: bool) -> Self {
        Self { grounded }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.grounded)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.grounded)
    }
}
