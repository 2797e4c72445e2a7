//! Task Watchdog Timer (TWDT) and software restart.
//!
//! The scheduler run loop feeds the watchdog at least once a second, so
//! only a unit of work that wedges the loop for the full timeout resets
//! the board.  A restart requested by a task goes through [`restart`].

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{error, info};

/// TWDT timeout.
pub const TIMEOUT_MS: u32 = 10_000;

/// Host exit code for a requested restart (`EX_TEMPFAIL`), so a process
/// supervisor can tell it apart from a crash.
#[cfg(not(target_os = "espidf"))]
pub const RESTART_EXIT_CODE: i32 = 75;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before the scheduler starts.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout)", TIMEOUT_MS);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }
                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): no-op");
            Self {}
        }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the calling task's TWDT entry; no shared state.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

/// Restart the firmware.  Never returns.
pub fn restart(reason: &str) -> ! {
    error!("Restarting: {}", reason);
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::hal::reset::restart()
    }
    #[cfg(not(target_os = "espidf"))]
    {
        std::process::exit(RESTART_EXIT_CODE)
    }
}
