//! Boxmon firmware: main entry point.
//!
//! Hexagonal architecture driven by a cooperative task scheduler.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioRelay/GpioLevel  Ds18b20/Bh1750/Sht3x/Ads1115  WifiAdapter │
//! │  HttpCloud            ConsoleDisplay   SystemClock  LogEventSink│
//! │  (host: sim::* in place of the board peripherals)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  TaskScheduler: acquisition · display · relays · cloud │    │
//! │  │  Context (readings, actuators, permission signal)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: logging, config, peripherals, autostart check, relays off,
//! scheduler.  The scheduler returns only to request a restart.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use boxmon::adapters::config_file::{DEFAULT_PATH, JsonFileConfig};
use boxmon::adapters::logging;
use boxmon::adapters::time::Uptime;
use boxmon::app::boot::{abort_autostart, build_scheduler};
use boxmon::app::ports::ConfigPort;
use boxmon::config::SystemConfig;
use boxmon::drivers::watchdog::{Watchdog, restart};

/// Executor task slots; the scheduler future is the only one.
const EXECUTOR_SLOTS: usize = 4;

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();
    logging::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Boxmon v{:<28}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;

    // ── 3. Peripherals and adapters ───────────────────────────
    let (mut hw, autostart) = platform::bring_up(&config)?;

    // ── 4. Autostart gate ─────────────────────────────────────
    if !autostart {
        let width = usize::from(config.display.max_chars);
        abort_autostart(hw.display.as_mut(), width, hw.events.as_mut());
        idle();
    }

    // ── 5. Scheduler ──────────────────────────────────────────
    let watchdog = Watchdog::new();
    let uptime = Uptime::new();
    let mut scheduler = build_scheduler(config, hw);
    info!("Scheduler: starting");

    let executor: edge_executor::LocalExecutor<'_, EXECUTOR_SLOTS> = edge_executor::LocalExecutor::new();
    let request = futures_lite::future::block_on(executor.run(scheduler.run(&uptime, &watchdog)));

    error!("Task '{}' requested a restart", request.task);
    restart(request.reason)
}

fn load_config() -> Result<SystemConfig> {
    #[cfg(target_os = "espidf")]
    if let Err(e) = boxmon::adapters::config_file::mount_storage() {
        warn!("{}", e);
    }

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BOXMON_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_PATH.to_string());
    let config = JsonFileConfig::new(&path).load().map_err(|e| {
        error!("Config: {} rejected: {}", path, e);
        e
    })?;
    info!(
        "Config: debounce {} samples, soil < {}%, humidity > {}%, {} light window(s)",
        config.debounce_window,
        config.thresholds.soil_dry_percent,
        config.thresholds.air_wet_percent,
        config.light_windows.len()
    );
    Ok(config)
}

/// Stay up without running any task, so the board can be reflashed or
/// inspected.
fn idle() -> ! {
    warn!("Idle: waiting for reset");
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}

// ───────────────────────────────────────────────────────────────
// Board bring-up (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use anyhow::Result;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::delay::{Ets, FreeRtos};
    use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, PinDriver};
    use esp_idf_svc::hal::prelude::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
    use log::{info, warn};

    use boxmon::adapters::console_display::ConsoleDisplay;
    use boxmon::adapters::http_cloud::HttpCloud;
    use boxmon::adapters::log_sink::LogEventSink;
    use boxmon::adapters::time::SystemClock;
    use boxmon::adapters::wifi::WifiAdapter;
    use boxmon::app::boot::{Hardware, autostart_permitted};
    use boxmon::app::ports::{ClimateSensor, ClockPort, NetworkPort, SoilAdc};
    use boxmon::config::SystemConfig;
    use boxmon::control::actuators::{ActuatorState, Pump, Relay, RelayId};
    use boxmon::drivers::hw_init::{claimed_pins, init_board};
    use boxmon::drivers::relay::{GpioLevel, GpioRelay};
    use boxmon::sensors::SensorSet;
    use boxmon::sensors::ads1115::{self, Ads1115};
    use boxmon::sensors::bh1750::{self, Bh1750};
    use boxmon::sensors::bus;
    use boxmon::sensors::ds18b20::Ds18b20Chain;
    use boxmon::sensors::sht3x::{self, Sht3x};

    fn relay(
        id: RelayId,
        line: u8,
        pin: PinDriver<'static, AnyOutputPin, Output>,
        active_low: bool,
    ) -> Option<Relay> {
        match GpioRelay::new(pin, active_low) {
            Ok(driver) => Some(Relay::new(id, line, Box::new(driver))),
            Err(e) => {
                warn!("Relay {} on GPIO{} unusable: {}", id, line, e);
                None
            }
        }
    }

    pub fn bring_up(config: &SystemConfig) -> Result<(Hardware, bool)> {
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        for (name, pin) in claimed_pins(&config.pins) {
            info!("GPIO{:<2} {}", pin, name);
        }
        let mut board = init_board(&config.pins, peripherals.i2c0)?;
        let autostart = autostart_permitted(&mut board.autostart);

        // ── Relays ────────────────────────────────────────────
        let pins = &config.pins;
        let active_low = pins.relays_active_low;
        let actuators = ActuatorState {
            pump: relay(RelayId::Pump, pins.relay_pump, board.pump, active_low)
                .map(|r| Pump::new(r, Box::new(GpioLevel::new(board.level)))),
            fan: relay(RelayId::Fan, pins.relay_fan, board.fan, active_low),
            light: relay(RelayId::Light, pins.relay_light, board.light, active_low),
        };

        // ── Sensors ───────────────────────────────────────────
        let mut sensors = SensorSet::default();
        match Ds18b20Chain::new(board.onewire, Ets) {
            Ok(chain) => {
                info!("One-wire: {} probe(s) found", chain.len());
                sensors.temperature = Some(Box::new(chain));
            }
            Err(e) => warn!("One-wire: {}, temperature probes absent", e),
        }

        match board.i2c {
            Ok(i2c) => {
                let shared = bus::share(i2c);
                match Bh1750::new(bus::device(shared), bh1750::DEFAULT_ADDRESS) {
                    Ok(light) => sensors.light = Some(Box::new(light)),
                    Err(e) => warn!("BH1750: {}, light absent", e),
                }
                let mut climate = Sht3x::new(bus::device(shared), FreeRtos, sht3x::DEFAULT_ADDRESS);
                match climate.read() {
                    Ok(_) => sensors.climate = Some(Box::new(climate)),
                    Err(e) => warn!("SHT3x: {}, climate absent", e),
                }
                let mut adc = Ads1115::new(bus::device(shared), FreeRtos, ads1115::DEFAULT_ADDRESS);
                match adc.read_raw(0) {
                    Ok(_) => sensors.soil = Some(Box::new(adc)),
                    Err(e) => warn!("ADS1115: {}, soil absent", e),
                }
            }
            Err(e) => warn!("{}: light, climate and soil absent", e),
        }

        // ── Network and clock ─────────────────────────────────
        let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        let mut network = WifiAdapter::new(&config.network, wifi)?;
        if let Err(e) = network.reconnect() {
            warn!("WiFi: initial connect failed ({}), cloud sync will retry", e);
        }
        let mut clock = SystemClock::new(config.network.utc_offset_hours);
        if network.is_connected() {
            if let Err(e) = clock.resync() {
                warn!("Clock: initial sync failed ({})", e);
            }
        }

        let hw = Hardware {
            sensors,
            actuators,
            display: Box::new(ConsoleDisplay::new()),
            cloud: Box::new(HttpCloud::new(&config.cloud, &config.network)),
            network: Box::new(network),
            clock: Box::new(clock),
            events: Box::new(LogEventSink::new()),
        };
        Ok((hw, autostart))
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use anyhow::Result;
    use log::info;

    use boxmon::adapters::console_display::ConsoleDisplay;
    use boxmon::adapters::log_sink::LogEventSink;
    use boxmon::adapters::sim::{SimClimate, SimCloud, SimLevel, SimLight, SimPin, SimProbes, SimRelay, SimSoil};
    use boxmon::adapters::time::SystemClock;
    use boxmon::adapters::wifi::WifiAdapter;
    use boxmon::app::boot::{Hardware, autostart_permitted};
    use boxmon::app::ports::NetworkPort;
    use boxmon::config::SystemConfig;
    use boxmon::control::actuators::{ActuatorState, Pump, Relay, RelayId};
    use boxmon::sensors::SensorSet;

    const SIM_SSID: &str = "boxmon-sim";

    fn relay(id: RelayId, line: u8) -> Relay {
        Relay::new(id, line, Box::new(SimRelay::new(id.name())))
    }

    pub fn bring_up(config: &SystemConfig) -> Result<(Hardware, bool)> {
        let autostart = autostart_permitted(&mut SimPin::from_env());

        let pins = &config.pins;
        let actuators = ActuatorState {
            pump: Some(Pump::new(relay(RelayId::Pump, pins.relay_pump), Box::new(SimLevel::new(30, 6)))),
            fan: Some(relay(RelayId::Fan, pins.relay_fan)),
            light: Some(relay(RelayId::Light, pins.relay_light)),
        };

        let sensors = SensorSet {
            temperature: Some(Box::new(SimProbes::default())),
            light: Some(Box::new(SimLight::default())),
            climate: Some(Box::new(SimClimate::default())),
            soil: Some(Box::new(SimSoil::new(config.soil.raw_wet, config.soil.raw_dry))),
        };

        let mut net = config.network.clone();
        if net.ssid.is_empty() {
            let _ = net.ssid.push_str(SIM_SSID);
        }
        let mut network = WifiAdapter::new(&net)?;
        network.reconnect().map_err(boxmon::error::Error::from)?;
        if let Some(cycles) = std::env::var("BOXMON_OUTAGE").ok().and_then(|v| v.parse().ok()) {
            network.simulate_outage(cycles);
        }
        info!("Host simulation: all peripherals simulated");

        let hw = Hardware {
            sensors,
            actuators,
            display: Box::new(ConsoleDisplay::new()),
            cloud: Box::new(SimCloud::default()),
            network: Box::new(network),
            clock: Box::new(SystemClock::new(config.network.utc_offset_hours)),
            events: Box::new(LogEventSink::new()),
        };
        Ok((hw, autostart))
    }
}
