//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] by reading one JSON document through
//! `std::fs` (the SPIFFS mount on the board, the working directory on the
//! host).  Fields the file omits keep their defaults.  A missing file
//! means "all defaults"; a file that exists but cannot be read, parsed or
//! validated is an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Where `main` looks when no path is given.
#[cfg(target_os = "espidf")]
pub const DEFAULT_PATH: &str = "/spiffs/boxmon.json";
#[cfg(not(target_os = "espidf"))]
pub const DEFAULT_PATH: &str = "boxmon.json";

/// Mount the SPIFFS partition holding [`DEFAULT_PATH`].  A board with
/// no storage partition simply runs on defaults.
#[cfg(target_os = "espidf")]
pub fn mount_storage() -> Result<(), ConfigError> {
    use esp_idf_svc::sys::{ESP_OK, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 2,
        format_if_mount_failed: false,
    };
    // SAFETY: called once from main before any file access; the strings
    // are 'static.
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK {
        return Err(ConfigError::IoError(std::io::Error::other(format!(
            "SPIFFS mount failed (rc={})",
            ret
        ))));
    }
    info!("Config: SPIFFS mounted at /spiffs");
    Ok(())
}

pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse and validate a JSON document.
    pub fn parse(text: &str) -> Result<SystemConfig, ConfigError> {
        let cfg: SystemConfig = serde_json::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Config: {} not found, using defaults", self.path.display());
                let cfg = SystemConfig::default();
                cfg.validate()?;
                return Ok(cfg);
            }
            Err(e) => return Err(ConfigError::IoError(e)),
        };
        let cfg = Self::parse(&text)?;
        info!("Config: loaded {}", self.path.display());
        Ok(cfg)
    }
}
