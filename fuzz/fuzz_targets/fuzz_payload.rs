//! Fuzz target: telemetry payload re-parsers
//!
//! Parses arbitrary text as both a query batch and a JSON object.  Any
//! payload that parses must survive a second encode/parse pass with the
//! same field set.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Re-encoding an accepted payload never adds or drops a field
//!
//! cargo fuzz run fuzz_payload

#![no_main]

use boxmon::telemetry::TelemetryPayload;
use libfuzzer_sys::fuzz_target;

fn same_fields(a: &TelemetryPayload, b: &TelemetryPayload) -> bool {
    a.len() == b.len() && a.fields().all(|f| b.contains(f))
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(p) = TelemetryPayload::from_query(text) {
        let again = TelemetryPayload::from_query(&p.to_query()).expect("query re-parse");
        assert!(same_fields(&p, &again));
    }

    if let Ok(p) = TelemetryPayload::from_json(text) {
        let again = TelemetryPayload::from_json(&p.to_json()).expect("json re-parse");
        assert!(same_fields(&p, &again));
    }
});
