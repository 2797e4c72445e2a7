//! Time adapters.
//!
//! - [`Uptime`] implements [`Monotonic`] for the scheduler.
//! - [`SystemClock`] implements [`ClockPort`]: the RTC converted to local
//!   time, disciplined by SNTP on the board.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for uptime,
//!   `EspSntp` for synchronisation.
//! - **all other targets**: `std::time::Instant`; the host clock is
//!   assumed to be synchronised already.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use time::{OffsetDateTime, UtcOffset};

use crate::app::ports::{ClockPort, Monotonic};
use crate::control::schedule::WallClock;
use crate::error::NetworkError;

/// Anything earlier is an RTC that has not been set since power-up.
const EPOCH_2020: i64 = 1_577_836_800;

// ───────────────────────────────────────────────────────────────
// Monotonic uptime
// ───────────────────────────────────────────────────────────────

/// Milliseconds since boot.
pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Monotonic for Uptime {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        // SAFETY: reads the free-running high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

// ───────────────────────────────────────────────────────────────
// Wall clock
// ───────────────────────────────────────────────────────────────

/// RTC in local time.
pub struct SystemClock {
    offset: UtcOffset,
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
}

impl SystemClock {
    /// `utc_offset_hours` outside ±23 falls back to UTC.
    pub fn new(utc_offset_hours: i8) -> Self {
        let offset = UtcOffset::from_hms(utc_offset_hours, 0, 0).unwrap_or_else(|_| {
            warn!("Clock: invalid UTC offset {}h, using UTC", utc_offset_hours);
            UtcOffset::UTC
        });
        Self {
            offset,
            #[cfg(target_os = "espidf")]
            sntp: None,
        }
    }

    /// Convert a Unix timestamp to local wall-clock time.  An RTC that
    /// still reports a pre-2020 date is treated as unsynchronised.
    pub fn local(&self, unix_secs: i64) -> WallClock {
        if unix_secs < EPOCH_2020 {
            return WallClock::UNSYNCED;
        }
        match OffsetDateTime::from_unix_timestamp(unix_secs) {
            Ok(utc) => WallClock::from_offset_datetime(utc.to_offset(self.offset)),
            Err(_) => WallClock::UNSYNCED,
        }
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> WallClock {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => self.local(d.as_secs() as i64),
            Err(_) => WallClock::UNSYNCED,
        }
    }

    #[cfg(target_os = "espidf")]
    fn resync(&mut self) -> Result<(), NetworkError> {
        use esp_idf_svc::sntp::{EspSntp, SyncStatus};

        // Dropping the old service stops it before a fresh one starts.
        self.sntp = None;
        let sntp = EspSntp::new_default().map_err(|e| {
            warn!("Clock: SNTP start failed: {:?}", e);
            NetworkError::ClockSyncFailed
        })?;
        let status = sntp.get_sync_status();
        self.sntp = Some(sntp);
        if status == SyncStatus::Completed {
            info!("Clock: SNTP sync completed");
        } else {
            info!("Clock: SNTP sync started ({:?})", status);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn resync(&mut self) -> Result<(), NetworkError> {
        info!("Clock(sim): host clock assumed synchronised");
        Ok(())
    }
}
