//! Startup wiring: from a validated config and a set of adapters to a
//! ready-to-run [`TaskScheduler`].
//!
//! ```text
//!   config ─┐
//!           ├─▶ all relays OFF ─▶ Context ─▶ TaskScheduler
//!   Hardware┘                                  ├─ acquisition
//!                                              ├─ display
//!                                              ├─ relays
//!                                              └─ cloud sync
//! ```
//!
//! The autostart check runs before any of this.  It lives here rather
//! than in `main` so the abort path can be exercised on the host.

use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::app::context::Context;
use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, CloudPort, DisplayPort, EventSink, NetworkPort};
use crate::config::SystemConfig;
use crate::control::actuators::ActuatorState;
use crate::display;
use crate::scheduler::TaskScheduler;
use crate::sensors::SensorSet;
use crate::tasks::{AcquisitionTask, CloudSyncTask, DisplayTask, RelayTask};

/// Every adapter the scheduler needs, already initialised.
pub struct Hardware {
    pub sensors: SensorSet,
    pub actuators: ActuatorState,
    pub display: Box<dyn DisplayPort>,
    pub cloud: Box<dyn CloudPort>,
    pub network: Box<dyn NetworkPort>,
    pub clock: Box<dyn ClockPort>,
    pub events: Box<dyn EventSink>,
}

/// Switch every relay off and register the four tasks.
pub fn build_scheduler(config: SystemConfig, hw: Hardware) -> TaskScheduler {
    let Hardware {
        sensors,
        mut actuators,
        display,
        cloud,
        network,
        clock,
        mut events,
    } = hw;

    actuators.all_off(events.as_mut());
    info!("Sensors installed: {:?}", sensors.installed());

    let acquisition = AcquisitionTask::new(sensors, &config);
    let frames = DisplayTask::new(display, &config);
    let relays = RelayTask::new(&config);
    let cloud = CloudSyncTask::new(cloud, &config);

    let mut scheduler = TaskScheduler::new(Context::new(config, actuators, network, clock, events));
    scheduler.add(Box::new(acquisition));
    scheduler.add(Box::new(frames));
    scheduler.add(Box::new(relays));
    scheduler.add(Box::new(cloud));
    scheduler
}

/// Sample the autostart pin once.  Grounded means abort.
///
/// A pin that cannot be read does not block startup.
pub fn autostart_permitted<P: InputPin>(pin: &mut P) -> bool {
    match pin.is_low() {
        Ok(grounded) => !grounded,
        Err(e) => {
            warn!("Autostart pin unreadable ({:?}), starting anyway", e);
            true
        }
    }
}

/// Report an aborted start on the display and the event sink.
pub fn abort_autostart(display: &mut dyn DisplayPort, width: usize, events: &mut dyn EventSink) {
    warn!("Autostart pin grounded, scheduler will not start");
    if let Err(e) = display.show(&display::autostart_aborted(width), width) {
        warn!("Display: abort frame failed: {}", e);
    }
    events.emit(&AppEvent::AutostartAborted);
}
