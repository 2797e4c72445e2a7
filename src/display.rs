//! Status frames for the character display.
//!
//! A frame is a page of fixed-width rows laid end to end, so a 16-column
//! panel wraps it into lines by itself.  Rows longer than the panel are
//! truncated; shorter rows are padded with spaces.
//!
//! ```text
//!   ┌────────────────┐
//!   │Status:         │
//!   │Connected       │
//!   │192.168.1.40    │
//!   │19/10/2026      │
//!   │14:05:33        │
//!   └────────────────┘
//! ```

use core::fmt::{self, Write as _};

use heapless::{Deque, String};

use crate::control::actuators::ActuatorState;
use crate::control::schedule::WallClock;
use crate::sensors::readings::SensorReadings;

/// Room for eight rows of up to 32 columns.
pub const FRAME_CAPACITY: usize = 256;
/// Frames built per display cycle.
pub const MAX_FRAMES: usize = 8;
/// Relay names are cut to this many characters.
const RELAY_NAME_CHARS: usize = 10;

pub type Frame = String<FRAME_CAPACITY>;

/// Accumulates padded rows into one frame.
struct FrameWriter {
    frame: Frame,
    width: usize,
}

impl FrameWriter {
    fn new(width: usize) -> Self {
        Self {
            frame: Frame::new(),
            width,
        }
    }

    /// Append one row, truncated or padded to the panel width.
    fn row(&mut self, args: fmt::Arguments<'_>) {
        let mut line: String<64> = String::new();
        let _ = line.write_fmt(args);
        let mut n = 0;
        for c in line.chars().take(self.width) {
            if self.frame.push(c).is_err() {
                return;
            }
            n += 1;
        }
        for _ in n..self.width {
            if self.frame.push(' ').is_err() {
                return;
            }
        }
    }

    fn centred(&mut self, text: &str) {
        let len = text.chars().count().min(self.width);
        let left = (self.width - len) / 2;
        self.row(format_args!("{:left$}{}", "", text, left = left));
    }

    fn finish(self) -> Frame {
        self.frame
    }
}

/// Network status: offline, or address and local time.
pub fn network_status(
    connected: bool,
    ip: Option<core::net::Ipv4Addr>,
    now: WallClock,
    width: usize,
) -> Frame {
    let mut w = FrameWriter::new(width);
    w.row(format_args!("Status:"));
    if !connected {
        w.row(format_args!("Offline"));
        return w.finish();
    }
    w.row(format_args!("Connected"));
    match ip {
        Some(ip) => w.row(format_args!("{}", ip)),
        None => w.row(format_args!("no address")),
    }
    if now.is_synced() {
        w.row(format_args!("{:02}/{:02}/{}", now.day, now.month, now.year));
        w.row(format_args!("{}:{:02}", now.time, now.second));
    } else {
        w.row(format_args!("clock not set"));
    }
    w.finish()
}

/// Probe temperatures and illuminance.  `None` when none are present.
pub fn probes_and_light(r: &SensorReadings, width: usize) -> Option<Frame> {
    if !r.any_probe() && r.light_lux.is_none() {
        return None;
    }
    let mut w = FrameWriter::new(width);
    for p in &r.probes {
        match p.celsius {
            Some(c) => w.row(format_args!("Temp {}: {:.1}C", p.id, c)),
            None => w.row(format_args!("Temp {}: --", p.id)),
        }
    }
    if let Some(lux) = r.light_lux {
        w.row(format_args!("Light: {:.0} lx", lux));
    }
    Some(w.finish())
}

/// Air temperature and humidity.  `None` when the sensor is absent.
pub fn climate(r: &SensorReadings, width: usize) -> Option<Frame> {
    let c = r.climate?;
    let mut w = FrameWriter::new(width);
    w.row(format_args!("Air temp:"));
    w.row(format_args!("{:.1}C", c.temperature_c));
    w.row(format_args!("Humidity:"));
    w.row(format_args!("{:.1}%", c.humidity_percent));
    Some(w.finish())
}

/// Soil moisture per channel, average and trigger threshold.
pub fn soil(r: &SensorReadings, trigger_percent: f32, width: usize) -> Option<Frame> {
    if r.soil.iter().all(Option::is_none) {
        return None;
    }
    let mut w = FrameWriter::new(width);
    for (ch, v) in r.soil.iter().enumerate() {
        match v {
            Some(pct) => w.row(format_args!("Soil {}: {:.0}%", ch, pct)),
            None => w.row(format_args!("Soil {}: --", ch)),
        }
    }
    match r.soil_average {
        Some(avg) => w.row(format_args!("Avg: {:.0}%", avg)),
        None => w.row(format_args!("Avg: --")),
    }
    w.row(format_args!("Trigger: {:.0}%", trigger_percent));
    Some(w.finish())
}

/// One `ON`/`OFF - name` row per installed relay.
pub fn relays(a: &ActuatorState, width: usize) -> Option<Frame> {
    let mut w = FrameWriter::new(width);
    let mut any = false;
    for (id, on) in a.states() {
        any = true;
        let name: String<RELAY_NAME_CHARS> = id.name().chars().take(RELAY_NAME_CHARS).collect();
        w.row(format_args!("{:<3} - {}", if on { "ON" } else { "OFF" }, name));
    }
    any.then(|| w.finish())
}

/// Overlay shown at the end of each frame while the network is down.
pub fn offline_banner(width: usize) -> Frame {
    let inner = width.saturating_sub(4);
    let mut w = FrameWriter::new(width);
    w.row(format_args!("!!{:^inner$}!!", "NETWORK", inner = inner));
    w.row(format_args!("!!{:^inner$}!!", "OFFLINE", inner = inner));
    w.row(format_args!("{:-<width$}", "", width = width));
    w.finish()
}

/// Shown once when the autostart pin aborts boot.
pub fn autostart_aborted(width: usize) -> Frame {
    let mut w = FrameWriter::new(width);
    w.row(format_args!(""));
    w.centred("AUTOSTART");
    w.centred("ABORTED");
    w.finish()
}

/// Everything the display task shows in one cycle, in order.
pub struct FrameSet<'a> {
    pub connected: bool,
    pub ip: Option<core::net::Ipv4Addr>,
    pub now: WallClock,
    pub readings: &'a SensorReadings,
    pub actuators: &'a ActuatorState,
    pub soil_trigger: f32,
    pub width: usize,
}

impl FrameSet<'_> {
    pub fn build(&self) -> Deque<Frame, MAX_FRAMES> {
        let mut q = Deque::new();
        let w = self.width;
        let frames = [
            Some(network_status(self.connected, self.ip, self.now, w)),
            probes_and_light(self.readings, w),
            climate(self.readings, w),
            soil(self.readings, self.soil_trigger, w),
            relays(self.actuators, w),
        ];
        for f in frames.into_iter().flatten() {
            let _ = q.push_back(f);
        }
        q
    }
}

/// Split a frame back into its rows (used by log-backed displays).
pub fn rows(frame: &str, width: usize) -> impl Iterator<Item = &str> {
    let width = width.max(1);
    let mut rest = frame;
    core::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let cut = rest
            .char_indices()
            .nth(width)
            .map_or(rest.len(), |(i, _)| i);
        let (row, tail) = rest.split_at(cut);
        rest = tail;
        Some(row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::schedule::TimeOfDay;
    use crate::sensors::readings::Climate;

    fn lines(f: &Frame) -> Vec<&str> {
        rows(f, 16).collect()
    }

    #[test]
    fn rows_are_padded_to_width() {
        let f = network_status(false, None, WallClock::UNSYNCED, 16);
        assert_eq!(f.len(), 32);
        assert_eq!(lines(&f), vec!["Status:         ", "Offline         "]);
    }

    #[test]
    fn connected_status_shows_address_and_time() {
        let now = WallClock {
            year: 2026,
            month: 10,
            day: 19,
            time: TimeOfDay::new(14, 5).unwrap(),
            second: 33,
        };
        let f = network_status(true, Some([192, 168, 1, 40].into()), now, 16);
        let l = lines(&f);
        assert_eq!(l[2].trim_end(), "192.168.1.40");
        assert_eq!(l[3].trim_end(), "19/10/2026");
        assert_eq!(l[4].trim_end(), "14:05:33");
    }

    #[test]
    fn long_rows_are_truncated() {
        let r = SensorReadings {
            light_lux: Some(12_345_678.0),
            ..Default::default()
        };
        let f = probes_and_light(&r, 16).unwrap();
        assert_eq!(lines(&f), vec!["Light: 12345678 "]);
    }

    #[test]
    fn absent_sensors_produce_no_frame() {
        let r = SensorReadings::with_layout(&[0], 2);
        assert!(probes_and_light(&r, 16).is_none());
        assert!(climate(&r, 16).is_none());
        assert!(soil(&r, 30.0, 16).is_none());
        assert!(relays(&ActuatorState::default(), 16).is_none());
    }

    #[test]
    fn frame_set_order() {
        let mut r = SensorReadings::with_layout(&[0], 2);
        r.climate = Some(Climate {
            temperature_c: 22.0,
            humidity_percent: 61.0,
        });
        r.soil[0] = Some(44.0);
        r.soil_average = Some(44.0);
        let a = ActuatorState::default();
        let set = FrameSet {
            connected: false,
            ip: None,
            now: WallClock::UNSYNCED,
            readings: &r,
            actuators: &a,
            soil_trigger: 30.0,
            width: 16,
        };
        let q = set.build();
        assert_eq!(q.len(), 3);
        let soil_frame = q.iter().nth(2).unwrap();
        assert_eq!(
            lines(soil_frame),
            vec!["Soil 0: 44%     ", "Soil 1: --      ", "Avg: 44%        ", "Trigger: 30%    "]
        );
    }

    #[test]
    fn banners() {
        let b = offline_banner(16);
        assert_eq!(b.as_str(), "!!  NETWORK   !!!!  OFFLINE   !!----------------");
        let a = autostart_aborted(16);
        assert_eq!(lines(&a)[1], "   AUTOSTART    ");
        assert_eq!(lines(&a)[2], "    ABORTED     ");
    }
}
