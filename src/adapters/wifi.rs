//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`], the hexagonal boundary for connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc`.
//! - **all other targets**: a simulated link for host runs and tests,
//!   with injectable outages.
//!
//! Reconnect attempts are bounded by the driver's own association
//! timeout.  How often to retry, and when to give up and restart, is the
//! cloud task's decision, not this adapter's.

use core::fmt;
use core::net::Ipv4Addr;

use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::config::NetworkConfig;
use crate::error::NetworkError;

// ───────────────────────────────────────────────────────────────
// Credential validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

impl std::error::Error for CredentialError {}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Link state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    ip: Option<Ipv4Addr>,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    /// Simulation: reconnects left to fail before the link comes back.
    #[cfg(not(target_os = "espidf"))]
    sim_outage: u32,
}

impl WifiAdapter {
    /// Configure the station interface.  Does not associate yet; call
    /// [`NetworkPort::reconnect`] for the first connection.
    #[cfg(target_os = "espidf")]
    pub fn new(
        config: &NetworkConfig,
        mut wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ) -> crate::error::Result<Self> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        check_credentials(config)?;
        let auth_method = if config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: config.ssid.as_str().try_into().map_err(|_| NetworkError::WifiConnectFailed)?,
            password: config.password.as_str().try_into().map_err(|_| NetworkError::WifiConnectFailed)?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .map_err(|_| NetworkError::WifiConnectFailed)?;
        wifi.start().map_err(|_| NetworkError::WifiConnectFailed)?;
        info!("WiFi: station started for '{}' as '{}'", config.ssid, config.hostname);

        Ok(Self {
            state: WifiState::Disconnected,
            ssid: config.ssid.clone(),
            ip: None,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &NetworkConfig) -> crate::error::Result<Self> {
        check_credentials(config)?;
        info!("WiFi(sim): station ready for '{}' as '{}'", config.ssid, config.hostname);
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: config.ssid.clone(),
            ip: None,
            sim_outage: 0,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Drop the simulated link; the next `cycles` reconnects fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_outage(&mut self, cycles: u32) {
        warn!("WiFi(sim): link dropped for {} reconnect(s)", cycles);
        self.sim_outage = cycles;
        self.state = WifiState::Disconnected;
        self.ip = None;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, NetworkError> {
        if self.wifi.is_connected().unwrap_or(false) {
            let _ = self.wifi.disconnect();
        }
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: associate failed: {:?}", e);
            NetworkError::WifiConnectFailed
        })?;
        self.wifi.wait_netif_up().map_err(|e| {
            warn!("WiFi: netif did not come up: {:?}", e);
            NetworkError::WifiConnectFailed
        })?;
        let info = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map_err(|_| NetworkError::WifiConnectFailed)?;
        Ok(info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, NetworkError> {
        if self.sim_outage > 0 {
            self.sim_outage -= 1;
            return Err(NetworkError::WifiConnectFailed);
        }
        Ok(Ipv4Addr::new(192, 168, 4, 20))
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

fn check_credentials(config: &NetworkConfig) -> Result<(), CredentialError> {
    validate_ssid(&config.ssid)?;
    validate_password(&config.password)
}

impl From<CredentialError> for crate::error::Error {
    fn from(_: CredentialError) -> Self {
        Self::Config("network.ssid / network.password invalid")
    }
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn reconnect(&mut self) -> Result<(), NetworkError> {
        let attempt = match self.state {
            WifiState::Reconnecting { attempt } => attempt + 1,
            _ => 1,
        };
        info!("WiFi: connecting to '{}' (attempt {})", self.ssid, attempt);
        match self.platform_connect() {
            Ok(ip) => {
                self.state = WifiState::Connected;
                self.ip = Some(ip);
                info!("WiFi: connected, IP {}", ip);
                Ok(())
            }
            Err(e) => {
                self.state = WifiState::Reconnecting { attempt };
                self.ip = None;
                Err(e)
            }
        }
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        if self.platform_is_connected() { self.ip } else { None }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
