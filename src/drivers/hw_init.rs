//! One-shot board peripheral initialisation.
//!
//! Claims the relay outputs, the float switch and autostart inputs, the
//! one-wire line and the primary I2C bus, using the pin numbers from
//! [`PinMap`].  Called once from `main()` before the scheduler starts.
//!
//! A relay or input pin that fails here is fatal; a sensor bus that fails
//! only leaves its sensors absent.

use core::fmt;

use crate::config::PinMap;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: u8, code: i32 },
    I2cInitFailed(i32),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, code } => write!(f, "GPIO{} config failed (rc={})", pin, code),
            Self::I2cInitFailed(rc) => write!(f, "I2C init failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed { .. } => Self::Init("GPIO config failed"),
            HwInitError::I2cInitFailed(_) => Self::Init("I2C init failed"),
        }
    }
}

/// Every pin the firmware drives or samples, in one place for the boot log.
pub fn claimed_pins(p: &PinMap) -> [(&'static str, u8); 6] {
    [
        ("relay_pump", p.relay_pump),
        ("relay_fan", p.relay_fan),
        ("relay_light", p.relay_light),
        ("water_level", p.water_level),
        ("autostart", p.autostart),
        ("onewire", p.onewire),
    ]
}

// ── Board peripherals (ESP-IDF) ───────────────────────────────

#[cfg(target_os = "espidf")]
pub use board::{Board, init_board};

#[cfg(target_os = "espidf")]
mod board {
    use esp_idf_svc::hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Input, InputOutput, Output, PinDriver, Pull};
    use esp_idf_svc::hal::i2c::{I2C0, I2cConfig, I2cDriver};
    use esp_idf_svc::hal::units::Hertz;
    use log::info;

    use super::HwInitError;
    use crate::config::PinMap;
    use crate::pins;

    const I2C_FREQ_HZ: u32 = 50_000;

    pub struct Board {
        pub pump: PinDriver<'static, AnyOutputPin, Output>,
        pub fan: PinDriver<'static, AnyOutputPin, Output>,
        pub light: PinDriver<'static, AnyOutputPin, Output>,
        pub level: PinDriver<'static, AnyInputPin, Input>,
        pub autostart: PinDriver<'static, AnyInputPin, Input>,
        pub onewire: PinDriver<'static, AnyIOPin, InputOutput>,
        pub i2c: Result<I2cDriver<'static>, HwInitError>,
    }

    fn output(pin: u8) -> Result<PinDriver<'static, AnyOutputPin, Output>, HwInitError> {
        // SAFETY: each configured pin number is claimed exactly once, here.
        let p = unsafe { AnyOutputPin::new(i32::from(pin)) };
        PinDriver::output(p).map_err(|e| HwInitError::GpioConfigFailed { pin, code: e.code() })
    }

    fn input_pull_up(pin: u8) -> Result<PinDriver<'static, AnyInputPin, Input>, HwInitError> {
        // SAFETY: as for `output`.
        let p = unsafe { AnyInputPin::new(i32::from(pin)) };
        let mut d = PinDriver::input(p).map_err(|e| HwInitError::GpioConfigFailed { pin, code: e.code() })?;
        d.set_pull(Pull::Up)
            .map_err(|e| HwInitError::GpioConfigFailed { pin, code: e.code() })?;
        Ok(d)
    }

    fn open_drain(pin: u8) -> Result<PinDriver<'static, AnyIOPin, InputOutput>, HwInitError> {
        // SAFETY: as for `output`.
        let p = unsafe { AnyIOPin::new(i32::from(pin)) };
        PinDriver::input_output_od(p).map_err(|e| HwInitError::GpioConfigFailed { pin, code: e.code() })
    }

    fn i2c(i2c0: I2C0) -> Result<I2cDriver<'static>, HwInitError> {
        // SAFETY: the primary bus pins are not in the configurable PinMap.
        let sda = unsafe { AnyIOPin::new(i32::from(pins::I2C0_SDA_GPIO)) };
        let scl = unsafe { AnyIOPin::new(i32::from(pins::I2C0_SCL_GPIO)) };
        let cfg = I2cConfig::new().baudrate(Hertz(I2C_FREQ_HZ));
        I2cDriver::new(i2c0, sda, scl, &cfg).map_err(|e| HwInitError::I2cInitFailed(e.code()))
    }

    pub fn init_board(map: &PinMap, i2c0: I2C0) -> Result<Board, HwInitError> {
        let board = Board {
            pump: output(map.relay_pump)?,
            fan: output(map.relay_fan)?,
            light: output(map.relay_light)?,
            level: input_pull_up(map.water_level)?,
            autostart: input_pull_up(map.autostart)?,
            onewire: open_drain(map.onewire)?,
            i2c: i2c(i2c0),
        };
        info!("hw_init: GPIO configured, I2C {}", if board.i2c.is_ok() { "up" } else { "down" });
        Ok(board)
    }
}
