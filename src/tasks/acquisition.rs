//! Sensor acquisition task.
//!
//! Reads every installed sensor in a fixed order:
//!
//! ```text
//!   Probes ──bus delay──▶ Light ──bus delay──▶ Climate ──bus delay──▶ Soil
//!                                                                      │
//!                        publish snapshot, sleep measure period ◀──────┘
//! ```
//!
//! Each stage is one unit of work; the pause between stages is a
//! scheduler sleep, so the display and relay tasks keep running while
//! the buses settle.  Results accumulate in a staging snapshot that is
//! published only once the whole cycle completes.

use core::time::Duration;

use log::{debug, warn};

use crate::app::context::Context;
use crate::config::{SoilCalibration, SystemConfig};
use crate::scheduler::{Step, Task};
use crate::sensors::SensorSet;
use crate::sensors::readings::SensorReadings;
use crate::sensors::soil;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Probes,
    Light,
    Climate,
    Soil,
}

impl Stage {
    fn next(self) -> Option<Self> {
        match self {
            Self::Probes => Some(Self::Light),
            Self::Light => Some(Self::Climate),
            Self::Climate => Some(Self::Soil),
            Self::Soil => None,
        }
    }
}

pub struct AcquisitionTask {
    sensors: SensorSet,
    staging: SensorReadings,
    stage: Stage,
    calibration: SoilCalibration,
    period: Duration,
    bus_delay: Duration,
}

impl AcquisitionTask {
    pub fn new(sensors: SensorSet, config: &SystemConfig) -> Self {
        Self {
            sensors,
            staging: SensorReadings::with_layout(&config.probes, config.soil.channels),
            stage: Stage::Probes,
            calibration: config.soil,
            period: Duration::from_secs(u64::from(config.intervals.measure_secs)),
            bus_delay: Duration::from_millis(u64::from(config.intervals.bus_delay_ms)),
        }
    }

    /// Read one stage.  Returns `true` if a bus was touched.
    fn read_stage(&mut self) -> bool {
        match self.stage {
            Stage::Probes => {
                let Some(bus) = self.sensors.temperature.as_mut() else {
                    return false;
                };
                for probe in &mut self.staging.probes {
                    probe.celsius = match bus.read_probe(probe.id) {
                        Ok(c) => Some(c),
                        Err(e) => {
                            warn!("Temperature probe {} read failed: {}", probe.id, e);
                            None
                        }
                    };
                }
                true
            }
            Stage::Light => {
                let Some(light) = self.sensors.light.as_mut() else {
                    return false;
                };
                self.staging.light_lux = light
                    .read_lux()
                    .inspect_err(|e| warn!("Light sensor read failed: {}", e))
                    .ok();
                true
            }
            Stage::Climate => {
                let Some(climate) = self.sensors.climate.as_mut() else {
                    return false;
                };
                self.staging.climate = climate
                    .read()
                    .inspect_err(|e| warn!("Climate sensor read failed: {}", e))
                    .ok();
                true
            }
            Stage::Soil => {
                let Some(adc) = self.sensors.soil.as_mut() else {
                    return false;
                };
                for (ch, slot) in self.staging.soil.iter_mut().enumerate() {
                    *slot = match adc.read_raw(ch as u8) {
                        Ok(raw) => Some(soil::moisture_percent(raw, &self.calibration)),
                        Err(e) => {
                            warn!("Soil channel {} read failed: {}", ch, e);
                            None
                        }
                    };
                }
                true
            }
        }
    }

    fn publish(&mut self, ctx: &mut Context) {
        self.staging.soil_average = soil::average(&self.staging.soil);
        self.staging.cycle = ctx.readings.cycle.wrapping_add(1);
        ctx.readings.clone_from(&self.staging);
        debug!(
            "Acquisition #{}: probes={:?} lux={:?} climate={:?} soil={:?} avg={:?}",
            self.staging.cycle,
            self.staging.probes.iter().map(|p| p.celsius).collect::<heapless::Vec<_, 4>>(),
            self.staging.light_lux,
            self.staging.climate,
            self.staging.soil,
            self.staging.soil_average,
        );
    }
}

impl Task for AcquisitionTask {
    fn name(&self) -> &'static str {
        "acquisition"
    }

    fn run(&mut self, ctx: &mut Context) -> Step {
        loop {
            let touched_bus = self.read_stage();
            match self.stage.next() {
                Some(next) => {
                    self.stage = next;
                    if touched_bus {
                        return Step::Sleep(self.bus_delay);
                    }
                }
                None => {
                    self.stage = Stage::Probes;
                    self.publish(ctx);
                    return Step::Sleep(self.period);
                }
            }
        }
    }
}
