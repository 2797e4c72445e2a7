//! Log backend selection.
//!
//! Everything in the crate logs through the `log` facade.  On the board
//! the records go to the IDF console; on the host they are bridged into a
//! `tracing` subscriber filtered by `RUST_LOG` (default `info`).

/// Install the log backend.  Call once, first thing in `main`.
#[cfg(target_os = "espidf")]
pub fn init() -> anyhow::Result<()> {
    esp_idf_logger::init()?;
    Ok(())
}

/// Install the log backend.  Call once, first thing in `main`.
#[cfg(not(target_os = "espidf"))]
pub fn init() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("log init failed: {e}"))
}

#[cfg(not(target_os = "espidf"))]
const DEFAULT_FILTER: &str = "info";
