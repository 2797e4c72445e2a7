//! Capacitive soil probe normalisation.
//!
//! The probes read high when dry and low when wet.  Readings outside the
//! calibrated span (shorted probe, disconnected channel) collapse to 0 %
//! and drop out of the average.

use crate::config::SoilCalibration;

/// Convert one raw ADC conversion to moisture percent (0..=100).
pub fn moisture_percent(raw: i16, cal: &SoilCalibration) -> f32 {
    if raw < cal.grounded_below || raw > cal.raw_dry {
        return 0.0;
    }
    let span = f32::from(cal.raw_dry) - f32::from(cal.raw_wet);
    if span <= 0.0 {
        return 0.0;
    }
    let pct = 100.0 - (f32::from(raw) - f32::from(cal.raw_wet)) / span * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Mean of the channels reading at least 1 %, or `None` if there are none.
pub fn average(channels: &[Option<f32>]) -> Option<f32> {
    let (sum, n) = channels
        .iter()
        .flatten()
        .filter(|&&v| v >= 1.0)
        .fold((0.0_f32, 0_u32), |(s, n), &v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f32)
}
