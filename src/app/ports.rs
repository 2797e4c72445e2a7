//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ tasks / control (domain)
//! ```
//!
//! Sensor drivers, relay lines, the display, the cloud client and the
//! network stack all sit behind these traits.  The tasks own their
//! collaborators as `Box<dyn …>` so the board build and the host
//! simulation wire different adapters into the same scheduler.
//!
//! Every call here is expected to be bounded: an adapter that talks to a
//! bus or a socket must enforce its own timeout, because the scheduler
//! cannot pre-empt it.

use core::net::Ipv4Addr;

use crate::config::SystemConfig;
use crate::control::schedule::WallClock;
use crate::error::{ActuatorError, CloudError, DisplayError, NetworkError, SensorError};
use crate::sensors::readings::Climate;
use crate::telemetry::TelemetryPayload;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One-wire temperature probe chain.
pub trait TemperatureBus {
    /// Trigger a conversion and read probe `probe` (°C).
    fn read_probe(&mut self, probe: u8) -> Result<f32, SensorError>;
}

/// Ambient light sensor.
pub trait LightSensor {
    fn read_lux(&mut self) -> Result<f32, SensorError>;
}

/// Combined air temperature / relative humidity sensor.
pub trait ClimateSensor {
    fn read(&mut self) -> Result<Climate, SensorError>;
}

/// Multi-channel ADC behind the soil moisture probes.
pub trait SoilAdc {
    /// Raw signed conversion result for `channel`.
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError>;
}

/// Reservoir float switch guarding the pump.
pub trait LevelSensor {
    /// `true` when the water is below the pump intake.
    fn is_low(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One relay line.  Idempotent: driving the current state again is
/// harmless.  Active-low wiring is the adapter's concern.
pub trait RelayDriver {
    fn drive(&mut self, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Character display.  `text` is a pre-formatted frame of
/// `max_width`-column rows laid end to end.
pub trait DisplayPort {
    fn show(&mut self, text: &str, max_width: usize) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Cloud port
// ───────────────────────────────────────────────────────────────

/// Telemetry endpoint.  Transport details (verb, auth token placement,
/// timeout) belong to the adapter.
pub trait CloudPort {
    /// Deliver one telemetry batch.
    fn push(&mut self, payload: &TelemetryPayload) -> Result<(), CloudError>;

    /// Fetch the raw value stored under `key`.
    fn pull(&mut self, key: &str) -> Result<String, CloudError>;

    /// Drop cached buffers and pooled connections after an
    /// [`OutOfMemory`](CloudError::OutOfMemory) failure.
    fn reclaim(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Network and clock ports
// ───────────────────────────────────────────────────────────────

/// Station-mode link to the access point.
pub trait NetworkPort {
    fn is_connected(&self) -> bool;

    /// Tear down and re-associate.  Bounded by the adapter's connect timeout.
    fn reconnect(&mut self) -> Result<(), NetworkError>;

    fn ip_address(&self) -> Option<Ipv4Addr>;
}

/// Local wall clock (RTC, disciplined by NTP).
pub trait ClockPort {
    /// Current local time.  Reports the sentinel year until synchronised.
    fn now(&self) -> WallClock;

    /// Re-run the time sync against the network.
    fn resync(&mut self) -> Result<(), NetworkError>;
}

/// Monotonic milliseconds since boot, used by the scheduler.
pub trait Monotonic {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the static configuration once at startup.  Implementations
/// MUST run [`SystemConfig::validate`] before returning.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The stored config could not be deserialised.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(std::io::Error),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

