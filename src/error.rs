//! Unified error types for the Boxmon firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! task-level error handling uniform.  All variants are `Copy` so they can
//! be passed through the scheduler and logged without allocation.
//!
//! None of these errors is fatal on its own: every task logs the failure
//! and waits for its next tick.  The only fatal outcome, a restart after
//! repeated connectivity loss, is a scheduler [`Step`](crate::scheduler::Step)
//! rather than an error.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// A relay command failed.
    Actuator(ActuatorError),
    /// The cloud collaborator failed a push or pull.
    Cloud(CloudError),
    /// The display collaborator failed to render.
    Display(DisplayError),
    /// Connectivity or clock sync failed.
    Network(NetworkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Cloud(e) => write!(f, "cloud: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction failed (NACK, CRC mismatch, timeout).
    BusFailed,
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// The requested probe is not on the bus.
    ProbeNotFound,
    /// No conversion has completed yet.
    NotReady,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFailed => write!(f, "bus transaction failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::ProbeNotFound => write!(f, "probe not found"),
            Self::NotReady => write!(f, "conversion pending"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Cloud errors
// ---------------------------------------------------------------------------

/// Classified outcome of a failed cloud exchange.  The retry policy in
/// [`crate::tasks::cloud`] matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudError {
    /// DNS or TCP connect failed; the link is probably down.
    HostUnreachable,
    /// The transport could not allocate buffers for the request.
    OutOfMemory,
    /// The endpoint answered with a non-success status.
    Rejected(u16),
    /// The request exceeded its timeout.
    Timeout,
    /// Anything else.
    Other,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostUnreachable => write!(f, "host unreachable"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Rejected(status) => write!(f, "rejected with status {status}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Other => write!(f, "request failed"),
        }
    }
}

impl From<CloudError> for Error {
    fn from(e: CloudError) -> Self {
        Self::Cloud(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The panel did not acknowledge the write.
    WriteFailed,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "display write failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    WifiConnectFailed,
    WifiDisconnected,
    ClockSyncFailed,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::ClockSyncFailed => write!(f, "clock sync failed"),
        }
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
