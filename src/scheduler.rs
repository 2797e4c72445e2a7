//! Cooperative task scheduler.
//!
//! Four periodic tasks share one thread.  Each [`Task::run`] call performs
//! one bounded unit of work and returns how long to wait before the next
//! one; nothing is ever pre-empted.
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                     TaskScheduler                        │
//!   │                                                          │
//!   │  slot 0        slot 1       slot 2        slot 3         │
//!   │  acquisition   display      relays        cloud sync     │
//!   │      │            │            │              │          │
//!   │      └────────────┴─────┬──────┴──────────────┘          │
//!   │                         ▼                                │
//!   │              &mut Context (one task at a time)           │
//!   └─────────────────────────┬────────────────────────────────┘
//!                             │ Tick::Idle { wake_at_ms }
//!                             ▼
//!                 Timer::after(..).await   (run loop)
//! ```
//!
//! [`TaskScheduler::tick`] is synchronous and takes the clock as a
//! parameter, so tests drive it with a manual clock.  [`TaskScheduler::run`]
//! is the async loop used by `main`.

use core::time::Duration;

use log::{info, warn};

use crate::app::context::Context;
use crate::app::ports::Monotonic;
use crate::drivers::watchdog::Watchdog;

/// What a task wants after one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run again after this long.
    Sleep(Duration),
    /// The process must restart; the only fatal outcome.
    Restart(&'static str),
}

/// One cooperatively scheduled task.
pub trait Task {
    fn name(&self) -> &'static str;

    /// Do one bounded unit of work.
    fn run(&mut self, ctx: &mut Context) -> Step;
}

/// A task asked for a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartRequest {
    pub task: &'static str,
    pub reason: &'static str,
}

/// Result of one scheduler pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing else is due before `wake_at_ms`.
    Idle { wake_at_ms: u64 },
    Restart(RestartRequest),
}

/// Number of task slots (stack-allocated).
pub const MAX_TASKS: usize = 4;

/// Longest the run loop sleeps before feeding the watchdog again.
const MAX_IDLE_MS: u64 = 1_000;

struct TaskEntry {
    task: Box<dyn Task>,
    due_ms: u64,
    runs: u64,
    overruns: u32,
}

pub struct TaskScheduler {
    slots: [Option<TaskEntry>; MAX_TASKS],
    ctx: Context,
    slice_budget_ms: u64,
}

impl TaskScheduler {
    pub fn new(ctx: Context) -> Self {
        let slice_budget_ms = u64::from(ctx.config.intervals.slice_budget_ms);
        Self {
            slots: [None, None, None, None],
            ctx,
            slice_budget_ms,
        }
    }

    /// Register a task, due immediately.  Returns the slot index, or
    /// `None` if all slots are taken.
    pub fn add(&mut self, task: Box<dyn Task>) -> Option<usize> {
        let (i, slot) = self.slots.iter_mut().enumerate().find(|(_, s)| s.is_none())?;
        info!("Scheduler: added '{}' at slot {}", task.name(), i);
        *slot = Some(TaskEntry {
            task,
            due_ms: 0,
            runs: 0,
            overruns: 0,
        });
        Some(i)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Completed units of work for the task in `slot`.
    pub fn runs(&self, slot: usize) -> Option<u64> {
        self.slots.get(slot)?.as_ref().map(|e| e.runs)
    }

    /// Units of work that exceeded the slice budget for the task in `slot`.
    pub fn overruns(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot)?.as_ref().map(|e| e.overruns)
    }

    /// Earliest time any task is due.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.slots.iter().flatten().map(|e| e.due_ms).min()
    }

    /// Run every due task once, in slot order.
    pub fn tick(&mut self, clock: &dyn Monotonic) -> Tick {
        for entry in self.slots.iter_mut().flatten() {
            if entry.due_ms > clock.now_ms() {
                continue;
            }
            let started = clock.now_ms();
            let step = entry.task.run(&mut self.ctx);
            let finished = clock.now_ms();
            entry.runs += 1;

            let elapsed = finished.saturating_sub(started);
            if elapsed > self.slice_budget_ms {
                entry.overruns += 1;
                warn!(
                    "Scheduler: '{}' held the loop for {} ms (budget {} ms)",
                    entry.task.name(),
                    elapsed,
                    self.slice_budget_ms
                );
            }

            match step {
                Step::Sleep(d) => {
                    entry.due_ms = finished.saturating_add(d.as_millis() as u64);
                }
                Step::Restart(reason) => {
                    return Tick::Restart(RestartRequest {
                        task: entry.task.name(),
                        reason,
                    });
                }
            }
        }

        Tick::Idle {
            wake_at_ms: self.next_due_ms().unwrap_or_else(|| clock.now_ms() + MAX_IDLE_MS),
        }
    }

    /// Drive the tasks until one requests a restart.
    pub async fn run(&mut self, clock: &dyn Monotonic, watchdog: &Watchdog) -> RestartRequest {
        loop {
            watchdog.feed();
            match self.tick(clock) {
                Tick::Idle { wake_at_ms } => {
                    let wait = wake_at_ms.saturating_sub(clock.now_ms()).min(MAX_IDLE_MS);
                    if wait > 0 {
                        async_io_mini::Timer::after(Duration::from_millis(wait)).await;
                    }
                }
                Tick::Restart(req) => return req,
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::AppEvent;
    use crate::app::ports::{ClockPort, EventSink, NetworkPort};
    use crate::config::SystemConfig;
    use crate::control::actuators::ActuatorState;
    use crate::control::schedule::WallClock;
    use crate::error::NetworkError;
    use core::cell::Cell;
    use core::net::Ipv4Addr;
    use std::rc::Rc;

    struct Offline;
    impl NetworkPort for Offline {
        fn is_connected(&self) -> bool {
            false
        }
        fn reconnect(&mut self) -> Result<(), NetworkError> {
            Err(NetworkError::WifiConnectFailed)
        }
        fn ip_address(&self) -> Option<Ipv4Addr> {
            None
        }
    }

    struct Unsynced;
    impl ClockPort for Unsynced {
        fn now(&self) -> WallClock {
            WallClock::UNSYNCED
        }
        fn resync(&mut self) -> Result<(), NetworkError> {
            Err(NetworkError::ClockSyncFailed)
        }
    }

    struct Quiet;
    impl EventSink for Quiet {
        fn emit(&mut self, _e: &AppEvent) {}
    }

    struct Manual(Rc<Cell<u64>>);
    impl Monotonic for Manual {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    /// Records the time of every run; optionally burns clock time.
    struct Probe {
        name: &'static str,
        period: Duration,
        busy_ms: u64,
        clock: Rc<Cell<u64>>,
        log: Rc<std::cell::RefCell<Vec<(&'static str, u64)>>>,
        restart_after: Option<u64>,
        runs: u64,
    }

    impl Task for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn run(&mut self, _ctx: &mut Context) -> Step {
            self.log.borrow_mut().push((self.name, self.clock.get()));
            self.clock.set(self.clock.get() + self.busy_ms);
            self.runs += 1;
            if self.restart_after == Some(self.runs) {
                return Step::Restart("test");
            }
            Step::Sleep(self.period)
        }
    }

    fn ctx() -> Context {
        Context::new(
            SystemConfig::default(),
            ActuatorState::default(),
            Box::new(Offline),
            Box::new(Unsynced),
            Box::new(Quiet),
        )
    }

    fn probe(
        name: &'static str,
        period_ms: u64,
        clock: &Rc<Cell<u64>>,
        log: &Rc<std::cell::RefCell<Vec<(&'static str, u64)>>>,
    ) -> Probe {
        Probe {
            name,
            period: Duration::from_millis(period_ms),
            busy_ms: 0,
            clock: clock.clone(),
            log: log.clone(),
            restart_after: None,
            runs: 0,
        }
    }

    #[test]
    fn tasks_run_at_independent_intervals() {
        let now = Rc::new(Cell::new(0));
        let log = Rc::default();
        let clock = Manual(now.clone());
        let mut s = TaskScheduler::new(ctx());
        s.add(Box::new(probe("fast", 1_000, &now, &log)));
        s.add(Box::new(probe("slow", 3_000, &now, &log)));

        for t in 0..=6 {
            now.set(t * 1_000);
            s.tick(&clock);
        }
        assert_eq!(s.runs(0), Some(7));
        assert_eq!(s.runs(1), Some(3));
        let slow: Vec<u64> = log
            .borrow()
            .iter()
            .filter(|(n, _)| *n == "slow")
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(slow, vec![0, 3_000, 6_000]);
    }

    #[test]
    fn idle_reports_earliest_due() {
        let now = Rc::new(Cell::new(0));
        let log = Rc::default();
        let clock = Manual(now.clone());
        let mut s = TaskScheduler::new(ctx());
        s.add(Box::new(probe("a", 5_000, &now, &log)));
        s.add(Box::new(probe("b", 2_000, &now, &log)));
        assert_eq!(s.tick(&clock), Tick::Idle { wake_at_ms: 2_000 });
    }

    #[test]
    fn slot_limit_is_four() {
        let now = Rc::new(Cell::new(0));
        let log = Rc::default();
        let mut s = TaskScheduler::new(ctx());
        for _ in 0..MAX_TASKS {
            assert!(s.add(Box::new(probe("x", 1, &now, &log))).is_some());
        }
        assert!(s.add(Box::new(probe("x", 1, &now, &log))).is_none());
    }

    #[test]
    fn overrun_is_counted_not_preempted() {
        let now = Rc::new(Cell::new(0));
        let log = Rc::default();
        let clock = Manual(now.clone());
        let mut s = TaskScheduler::new(ctx());
        let mut hog = probe("hog", 1_000, &now, &log);
        hog.busy_ms = 2_000;
        s.add(Box::new(hog));
        s.add(Box::new(probe("next", 1_000, &now, &log)));
        s.tick(&clock);
        assert_eq!(s.overruns(0), Some(1));
        assert_eq!(s.overruns(1), Some(0));
        // The sibling still ran in the same pass, after the hog finished.
        assert_eq!(log.borrow()[1], ("next", 2_000));
    }

    #[test]
    fn restart_request_stops_the_pass() {
        let now = Rc::new(Cell::new(0));
        let log = Rc::default();
        let clock = Manual(now.clone());
        let mut s = TaskScheduler::new(ctx());
        let mut p = probe("net", 1_000, &now, &log);
        p.restart_after = Some(2);
        s.add(Box::new(p));
        assert!(matches!(s.tick(&clock), Tick::Idle { .. }));
        now.set(1_000);
        assert_eq!(
            s.tick(&clock),
            Tick::Restart(RestartRequest {
                task: "net",
                reason: "test"
            })
        );
    }
}
