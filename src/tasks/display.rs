//! Display task: cycles through the status frames.
//!
//! The queue is built from the current snapshot, shown one frame per unit
//! of work, and rebuilt only when it runs dry.  While the network is down
//! the tail of every frame is replaced by the offline banner.

use core::time::Duration;

use heapless::Deque;
use log::warn;

use crate::app::context::Context;
use crate::app::ports::DisplayPort;
use crate::config::SystemConfig;
use crate::display::{self, Frame, FrameSet, MAX_FRAMES};
use crate::scheduler::{Step, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Frame,
    Banner,
}

pub struct DisplayTask {
    display: Box<dyn DisplayPort>,
    queue: Deque<Frame, MAX_FRAMES>,
    phase: Phase,
    frame_time: Duration,
    banner_time: Duration,
    width: usize,
}

impl DisplayTask {
    pub fn new(display: Box<dyn DisplayPort>, config: &SystemConfig) -> Self {
        Self {
            display,
            queue: Deque::new(),
            phase: Phase::Frame,
            frame_time: Duration::from_secs(u64::from(config.intervals.frame_secs)),
            banner_time: Duration::from_secs(u64::from(config.intervals.offline_banner_secs)),
            width: usize::from(config.display.max_chars),
        }
    }

    fn rebuild(&mut self, ctx: &Context) {
        self.queue = FrameSet {
            connected: ctx.network.is_connected(),
            ip: ctx.network.ip_address(),
            now: ctx.clock.now(),
            readings: &ctx.readings,
            actuators: &ctx.actuators,
            soil_trigger: ctx.config.thresholds.soil_dry_percent,
            width: self.width,
        }
        .build();
    }
}

impl Task for DisplayTask {
    fn name(&self) -> &'static str {
        "display"
    }

    fn run(&mut self, ctx: &mut Context) -> Step {
        if self.phase == Phase::Banner {
            self.phase = Phase::Frame;
            if let Err(e) = self.display.show(&display::offline_banner(self.width), self.width) {
                warn!("Display: offline banner failed: {}", e);
            }
            return Step::Sleep(self.banner_time);
        }

        if self.queue.is_empty() {
            self.rebuild(ctx);
        }
        let Some(frame) = self.queue.pop_front() else {
            return Step::Sleep(self.frame_time);
        };

        if let Err(e) = self.display.show(&frame, self.width) {
            warn!("Display: frame failed: {}", e);
            return Step::Sleep(self.frame_time);
        }
        if ctx.network.is_connected() {
            Step::Sleep(self.frame_time)
        } else {
            self.phase = Phase::Banner;
            Step::Sleep(self.frame_time.saturating_sub(self.banner_time))
        }
    }
}
