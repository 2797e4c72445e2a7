//! System configuration parameters
//!
//! All tunable parameters for the Boxmon controller.  Loaded once at
//! startup from a JSON file (see [`JsonFileConfig`](crate::adapters::config_file::JsonFileConfig));
//! any field the file omits keeps its default.  There is no hot reload.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::debounce::{DEFAULT_DEBOUNCE_WINDOW, MAX_DEBOUNCE_WINDOW};
use crate::control::schedule::{ScheduleWindow, TimeOfDay};
use crate::pins;

/// Maximum number of light-relay windows.
pub const MAX_LIGHT_WINDOWS: usize = 8;
/// Maximum number of one-wire temperature probes.
pub const MAX_PROBES: usize = 4;
/// Channels on the soil ADC.
pub const MAX_SOIL_CHANNELS: usize = 4;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Agreeing samples required before a relay condition is acted on.
    pub debounce_window: u8,
    pub thresholds: Thresholds,
    /// Light relay on-windows, local time.
    pub light_windows: Vec<ScheduleWindow, MAX_LIGHT_WINDOWS>,
    pub intervals: TaskIntervals,
    pub pins: PinMap,
    /// Temperature probe ids, in display and payload order.
    pub probes: Vec<u8, MAX_PROBES>,
    pub soil: SoilCalibration,
    pub display: DisplayConfig,
    pub network: NetworkConfig,
    pub cloud: CloudConfig,
}

/// Relay trigger thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Soil average (%) below which the soil counts as dry.
    pub soil_dry_percent: f32,
    /// Relative humidity (%) above which the air counts as wet.
    pub air_wet_percent: f32,
}

/// Per-task periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskIntervals {
    /// Sensor acquisition period (seconds).
    pub measure_secs: u32,
    /// Display frame duration (seconds).
    pub frame_secs: u32,
    /// Relay evaluation period (seconds).
    pub relay_secs: u32,
    /// Cloud sync period (seconds).
    pub network_secs: u32,
    /// Pause between accesses to the shared sensor buses (milliseconds).
    pub bus_delay_ms: u32,
    /// Tail of each frame replaced by the offline banner (seconds).
    pub offline_banner_secs: u32,
    /// A unit of task work longer than this is logged as an overrun.
    pub slice_budget_ms: u32,
}

/// GPIO assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub autostart: u8,
    pub onewire: u8,
    pub relay_pump: u8,
    pub relay_light: u8,
    pub relay_fan: u8,
    pub water_level: u8,
    /// Relay board closes its contact when the input is driven LOW.
    pub relays_active_low: bool,
}

/// Raw ADC → moisture percent mapping for the capacitive soil probes.
///
/// `percent = 100 - (raw - raw_wet) / (raw_dry - raw_wet) * 100`.
/// A raw value below `grounded_below` (probe shorted or unplugged) or
/// above `raw_dry` is reported as 0 %.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilCalibration {
    /// Number of ADC channels wired to probes.
    pub channels: u8,
    pub grounded_below: i16,
    /// Reading with the probe in water.
    pub raw_wet: i16,
    /// Reading with the probe in dry air.
    pub raw_dry: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Columns per display row.
    pub max_chars: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Access point to join.
    pub ssid: String<32>,
    /// WPA2 passphrase; empty for an open network.
    pub password: String<64>,
    pub hostname: String<32>,
    /// Offset applied to UTC for schedule windows and the status frame.
    pub utc_offset_hours: i8,
    /// Upper bound on one HTTP exchange (seconds).
    pub request_timeout_secs: u32,
    /// Consecutive failed reconnect cycles tolerated before a restart.
    pub reconnect_attempts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the telemetry endpoint.
    pub endpoint: String<128>,
    /// Device auth token.
    pub token: String<64>,
    /// Key holding the remote pump permission.
    pub permission_key: String<32>,
}

// ── Defaults ──────────────────────────────────────────────────

fn window(sh: u8, sm: u8, eh: u8, em: u8) -> Option<ScheduleWindow> {
    Some(ScheduleWindow::new(TimeOfDay::new(sh, sm)?, TimeOfDay::new(eh, em)?))
}

fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        let light_windows = [
            window(8, 0, 9, 0),
            window(11, 0, 12, 0),
            window(15, 35, 16, 55),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW as u8,
            thresholds: Thresholds::default(),
            light_windows,
            intervals: TaskIntervals::default(),
            pins: PinMap::default(),
            probes: [0, 1].into_iter().collect(),
            soil: SoilCalibration::default(),
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
            cloud: CloudConfig::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            soil_dry_percent: 30.0,
            air_wet_percent: 70.0,
        }
    }
}

impl Default for TaskIntervals {
    fn default() -> Self {
        Self {
            measure_secs: 5,
            frame_secs: 5,
            relay_secs: 5,
            network_secs: 60,
            bus_delay_ms: 200,
            offline_banner_secs: 1,
            slice_budget_ms: 500,
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            autostart: pins::AUTOSTART_GPIO,
            onewire: pins::ONEWIRE_GPIO,
            relay_pump: pins::RELAY_PUMP_GPIO,
            relay_light: pins::RELAY_LIGHT_GPIO,
            relay_fan: pins::RELAY_FAN_GPIO,
            water_level: pins::WATER_LEVEL_GPIO,
            relays_active_low: true,
        }
    }
}

impl Default for SoilCalibration {
    fn default() -> Self {
        Self {
            channels: MAX_SOIL_CHANNELS as u8,
            grounded_below: 100,
            raw_wet: 7_500,
            raw_dry: 17_500,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { max_chars: 16 }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            hostname: fixed("boxmon"),
            utc_offset_hours: 1,
            request_timeout_secs: 10,
            reconnect_attempts: 5,
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: fixed("http://blynk.cloud/external/api"),
            token: String::new(),
            permission_key: fixed("pump_enable"),
        }
    }
}

// ── Validation ────────────────────────────────────────────────

impl SystemConfig {
    /// Check completeness and ranges once, at init.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg| Err(ConfigError::ValidationFailed(msg));

        if self.debounce_window == 0 || usize::from(self.debounce_window) > MAX_DEBOUNCE_WINDOW {
            return fail("debounce_window must be 1..=16");
        }
        if !(0.0..=100.0).contains(&self.thresholds.soil_dry_percent) {
            return fail("thresholds.soil_dry_percent must be 0..=100");
        }
        if !(0.0..=100.0).contains(&self.thresholds.air_wet_percent) {
            return fail("thresholds.air_wet_percent must be 0..=100");
        }

        let iv = &self.intervals;
        if iv.measure_secs == 0 || iv.frame_secs == 0 || iv.relay_secs == 0 || iv.network_secs == 0 {
            return fail("task intervals must be non-zero");
        }
        if iv.offline_banner_secs >= iv.frame_secs {
            return fail("intervals.offline_banner_secs must be shorter than frame_secs");
        }
        if u64::from(iv.bus_delay_ms) * 4 >= u64::from(iv.measure_secs) * 1000 {
            return fail("intervals.bus_delay_ms leaves no room in the measure period");
        }

        if usize::from(self.soil.channels) > MAX_SOIL_CHANNELS {
            return fail("soil.channels exceeds the ADC channel count");
        }
        if self.soil.raw_dry <= self.soil.raw_wet {
            return fail("soil.raw_dry must be above soil.raw_wet");
        }

        let p = &self.pins;
        let relays = [p.relay_pump, p.relay_light, p.relay_fan];
        if relays[0] == relays[1] || relays[0] == relays[2] || relays[1] == relays[2] {
            return fail("relay pins must be distinct");
        }
        if relays.contains(&p.water_level) || relays.contains(&p.autostart) {
            return fail("relay pins overlap an input pin");
        }

        if self.display.max_chars < 8 {
            return fail("display.max_chars must be at least 8");
        }
        if self.network.reconnect_attempts == 0 {
            return fail("network.reconnect_attempts must be non-zero");
        }
        if !(-12..=14).contains(&self.network.utc_offset_hours) {
            return fail("network.utc_offset_hours must be -12..=14");
        }
        if self.cloud.endpoint.is_empty() {
            return fail("cloud.endpoint is required");
        }
        if self.cloud.permission_key.is_empty() {
            return fail("cloud.permission_key is required");
        }
        Ok(())
    }
}
