//! Fuzz target: `parse_permission` (remote pump permission)
//!
//! Feeds arbitrary response bodies to the permission parser.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A grant is only ever reported for a body that reads as the integer 1
//!
//! cargo fuzz run fuzz_permission

#![no_main]

use boxmon::telemetry::parse_permission;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    if parse_permission(body) == Some(true) {
        let digits: String = body.chars().filter(|c| c.is_ascii_digit()).collect();
        assert_eq!(
            digits.trim_start_matches('0'),
            "1",
            "granted on a body that is not 1: {:?}",
            body
        );
    }
});
