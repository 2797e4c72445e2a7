//! Display adapter that writes each frame to the log, one record per row.
//!
//! Used by the host build and by boards without a panel fitted.  The
//! frame is already padded to the panel width, so the rows line up in
//! the console exactly as they would on the glass.

use log::info;

use crate::app::ports::DisplayPort;
use crate::display;
use crate::error::DisplayError;

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    frames: u64,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames shown since boot.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplayPort for ConsoleDisplay {
    fn show(&mut self, text: &str, max_width: usize) -> Result<(), DisplayError> {
        self.frames += 1;
        info!("LCD   | ┌{:─<w$}┐", "", w = max_width);
        for row in display::rows(text, max_width) {
            info!("LCD   | │{:<w$}│", row, w = max_width);
        }
        info!("LCD   | └{:─<w$}┘", "", w = max_width);
        Ok(())
    }
}
