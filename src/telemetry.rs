//! Telemetry payload: what the cloud sync task pushes each cycle.
//!
//! Built from the current [`SensorReadings`] and [`ActuatorState`].  A
//! sensor that is absent (or produced a non-finite value) is left out
//! entirely; it is never zero-filled.  Relay states and the low-water flag
//! travel as `1`/`0`.
//!
//! Two encodings are provided: a JSON object for body-carrying transports
//! and a `key=value&…` batch for query-string transports.  Both parse back
//! to the same field set.

use core::fmt::{self, Write as _};

use heapless::Vec;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{MAX_PROBES, MAX_SOIL_CHANNELS};
use crate::control::actuators::{ActuatorState, RelayId};
use crate::sensors::readings::SensorReadings;

/// Upper bound on payload entries: probes, light, climate pair, soil
/// channels, three relays and the low-water flag.
pub const MAX_FIELDS: usize = MAX_PROBES + 3 + MAX_SOIL_CHANNELS + 4;

/// Remote key for each payload entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Probe(u8),
    Lux,
    AirTemperature,
    AirHumidity,
    Soil(u8),
    Relay(RelayId),
    LowWater,
}

impl Field {
    /// Parse a wire key back into a field.
    pub fn parse(key: &str) -> Option<Self> {
        let indexed = |prefix: &str| key.strip_prefix(prefix)?.parse::<u8>().ok();
        match key {
            "lux" => Some(Self::Lux),
            "air_temp" => Some(Self::AirTemperature),
            "air_humidity" => Some(Self::AirHumidity),
            "relay_pump" => Some(Self::Relay(RelayId::Pump)),
            "relay_fan" => Some(Self::Relay(RelayId::Fan)),
            "relay_light" => Some(Self::Relay(RelayId::Light)),
            "low_water" => Some(Self::LowWater),
            _ => indexed("temp_")
                .map(Self::Probe)
                .or_else(|| indexed("soil_").map(Self::Soil)),
        }
    }

    /// Flags carry 1/0 rather than a measurement.
    pub fn is_flag(self) -> bool {
        matches!(self, Self::Relay(_) | Self::LowWater)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe(id) => write!(f, "temp_{id}"),
            Self::Lux => f.write_str("lux"),
            Self::AirTemperature => f.write_str("air_temp"),
            Self::AirHumidity => f.write_str("air_humidity"),
            Self::Soil(ch) => write!(f, "soil_{ch}"),
            Self::Relay(RelayId::Pump) => f.write_str("relay_pump"),
            Self::Relay(RelayId::Fan) => f.write_str("relay_fan"),
            Self::Relay(RelayId::Light) => f.write_str("relay_light"),
            Self::LowWater => f.write_str("low_water"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Reading(f32),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading(v) => write!(f, "{v}"),
            Self::Flag(b) => f.write_str(if *b { "1" } else { "0" }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    Malformed,
    UnknownField,
    BadValue,
    TooManyFields,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "payload is not a flat key/value object"),
            Self::UnknownField => write!(f, "unknown payload field"),
            Self::BadValue => write!(f, "payload value is not a finite number"),
            Self::TooManyFields => write!(f, "payload exceeds field capacity"),
        }
    }
}

impl std::error::Error for PayloadError {}

// ═══════════════════════════════════════════════════════════════
//  Payload
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryPayload {
    entries: Vec<(Field, FieldValue), MAX_FIELDS>,
}

impl TelemetryPayload {
    pub fn build(readings: &SensorReadings, actuators: &ActuatorState) -> Self {
        let mut p = Self::default();
        for probe in &readings.probes {
            p.reading(Field::Probe(probe.id), probe.celsius);
        }
        p.reading(Field::Lux, readings.light_lux);
        if let Some(c) = readings.climate {
            p.reading(Field::AirTemperature, Some(c.temperature_c));
            p.reading(Field::AirHumidity, Some(c.humidity_percent));
        }
        for (ch, value) in readings.soil.iter().enumerate() {
            p.reading(Field::Soil(ch as u8), *value);
        }
        for (id, on) in actuators.states() {
            p.flag(Field::Relay(id), on);
        }
        if let Some(pump) = &actuators.pump {
            p.flag(Field::LowWater, pump.low_water());
        }
        p
    }

    fn reading(&mut self, field: Field, value: Option<f32>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            let _ = self.entries.push((field, FieldValue::Reading(v)));
        }
    }

    fn flag(&mut self, field: Field, on: bool) {
        let _ = self.entries.push((field, FieldValue::Flag(on)));
    }

    fn insert(&mut self, field: Field, value: FieldValue) -> Result<(), PayloadError> {
        if self.entries.iter().any(|(f, _)| *f == field) {
            return Err(PayloadError::Malformed);
        }
        self.entries
            .push((field, value))
            .map_err(|_| PayloadError::TooManyFields)
    }

    pub fn get(&self, field: Field) -> Option<FieldValue> {
        self.entries.iter().find(|(f, _)| *f == field).map(|(_, v)| *v)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Encodings ─────────────────────────────────────────────

    pub fn to_json(&self) -> String {
        // Serialising a flat map of numbers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(s: &str) -> Result<Self, PayloadError> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(s).map_err(|_| PayloadError::Malformed)?;
        let mut p = Self::default();
        for (key, value) in &map {
            let field = Field::parse(key).ok_or(PayloadError::UnknownField)?;
            let v = value.as_f64().ok_or(PayloadError::BadValue)?;
            p.insert(field, decode(field, v)?)?;
        }
        Ok(p)
    }

    /// `key=value&key=value`, in build order.
    pub fn to_query(&self) -> String {
        let mut out = String::new();
        for (i, (field, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            let _ = write!(out, "{field}={value}");
        }
        out
    }

    pub fn from_query(s: &str) -> Result<Self, PayloadError> {
        let mut p = Self::default();
        for pair in s.split('&').filter(|s| !s.is_empty()) {
            let (key, raw) = pair.split_once('=').ok_or(PayloadError::Malformed)?;
            let field = Field::parse(key).ok_or(PayloadError::UnknownField)?;
            let v = raw.parse::<f64>().map_err(|_| PayloadError::BadValue)?;
            p.insert(field, decode(field, v)?)?;
        }
        Ok(p)
    }
}

fn decode(field: Field, v: f64) -> Result<FieldValue, PayloadError> {
    if !v.is_finite() {
        return Err(PayloadError::BadValue);
    }
    Ok(if field.is_flag() {
        FieldValue::Flag(v != 0.0)
    } else {
        FieldValue::Reading(v as f32)
    })
}

impl Serialize for TelemetryPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            let key = field.to_string();
            match value {
                FieldValue::Reading(v) => map.serialize_entry(&key, v)?,
                FieldValue::Flag(b) => map.serialize_entry(&key, &u8::from(*b))?,
            }
        }
        map.end()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Remote permission
// ═══════════════════════════════════════════════════════════════

/// Interpret the permission value pulled from the cloud.
///
/// `1` grants, any other integer revokes, anything unparsable yields
/// `None` so the caller keeps its previous value.
pub fn parse_permission(raw: &str) -> Option<bool> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '[' || c == ']');
    trimmed.trim().parse::<i64>().ok().map(|v| v == 1)
}
