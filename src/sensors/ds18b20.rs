//! DS18B20 temperature probes on a one-wire bus.
//!
//! ```text
//!   boot:  device search ──▶ probes[0..n]   (probe id = index, DS18B20s only)
//!
//!   read_probe(id):
//!     read_data(probes[id])              (result of last conversion)
//!     start_temp_measurement(probes[id]) (ready by the next cycle)
//! ```
//!
//! A 12-bit conversion takes 750 ms, longer than a scheduler slice, so
//! the driver never waits for one: every read returns the conversion
//! started on the previous cycle and starts the next.  The first read of
//! each probe after boot reports [`SensorError::NotReady`].
//!
//! The `one-wire-bus` and `ds18b20` crates are written against the
//! embedded-hal 0.2 pin and delay traits, which esp-idf-hal still
//! implements for `PinDriver` and `Ets`.  The data line must be
//! open-drain with an external pull-up.

use core::fmt::Debug;

use ds18b20::Ds18b20;
use embedded_hal_0_2::blocking::delay::DelayUs;
use embedded_hal_0_2::digital::v2::{InputPin, OutputPin};
use heapless::Vec;
use log::{debug, warn};
use one_wire_bus::{Address, OneWire, OneWireError};

use crate::app::ports::TemperatureBus;
use crate::config::MAX_PROBES;
use crate::error::SensorError;

fn bus_error<E: Debug>(e: OneWireError<E>) -> SensorError {
    debug!("one-wire: {:?}", e);
    match e {
        OneWireError::PinError(_) => SensorError::GpioReadFailed,
        _ => SensorError::BusFailed,
    }
}

pub struct Ds18b20Chain<P, D> {
    wire: OneWire<P>,
    delay: D,
    probes: Vec<Ds18b20, MAX_PROBES>,
    primed: [bool; MAX_PROBES],
}

impl<P, E, D> Ds18b20Chain<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    E: Debug,
    D: DelayUs<u16>,
{
    /// Take the line and enumerate the probes.  Fails if none answer.
    pub fn new(pin: P, mut delay: D) -> Result<Self, SensorError> {
        let mut wire = OneWire::new(pin).map_err(bus_error)?;
        let mut addresses: Vec<Address, MAX_PROBES> = Vec::new();
        for found in wire.devices(false, &mut delay) {
            let address = found.map_err(bus_error)?;
            if address.family_code() != ds18b20::FAMILY_CODE {
                debug!("one-wire: skipping {:?}", address);
                continue;
            }
            if addresses.push(address).is_err() {
                warn!("one-wire: more than {} probes, ignoring the rest", MAX_PROBES);
                break;
            }
        }
        if addresses.is_empty() {
            return Err(SensorError::ProbeNotFound);
        }
        Self::with_addresses(wire, delay, &addresses)
    }

    /// Use known probe addresses instead of searching.
    pub fn with_addresses(wire: OneWire<P>, delay: D, addresses: &[Address]) -> Result<Self, SensorError> {
        let mut probes = Vec::new();
        for &address in addresses.iter().take(MAX_PROBES) {
            let probe = Ds18b20::new::<E>(address).map_err(bus_error)?;
            // `take` keeps this within capacity.
            let _ = probes.push(probe);
        }
        Ok(Self {
            wire,
            delay,
            probes,
            primed: [false; MAX_PROBES],
        })
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl<P, E, D> TemperatureBus for Ds18b20Chain<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    E: Debug,
    D: DelayUs<u16>,
{
    fn read_probe(&mut self, probe: u8) -> Result<f32, SensorError> {
        let i = usize::from(probe);
        let sensor = self.probes.get(i).ok_or(SensorError::ProbeNotFound)?;
        let reading = if self.primed[i] {
            sensor
                .read_data(&mut self.wire, &mut self.delay)
                .map(|data| data.temperature)
                .map_err(bus_error)
        } else {
            Err(SensorError::NotReady)
        };
        self.primed[i] = sensor.start_temp_measurement(&mut self.wire, &mut self.delay).is_ok();
        reading
    }
}
