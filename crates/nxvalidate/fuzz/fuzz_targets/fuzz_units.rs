//! Fuzz target for unit-string parsing.
//!
//! This fuzzer tests that the unit parser:
//! 1. Never panics on any input
//! 2. Survives pathological exponents and prefixes
//! 3. Agrees with category classification

#![no_main]

use libfuzzer_sys::fuzz_target;
use nxvalidate::schema::parse_units;
use nxvalidate::UnitCategory;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(units) = std::str::from_utf8(data) {
        let parsed = parse_units(units);
        let category = UnitCategory::classify(Some(units));

        // A parseable unit always classifies into some category.
        assert_eq!(parsed.is_some(), category != UnitCategory::None);
        if category != UnitCategory::None {
            assert!(category.accepts(Some(units)));
        }
    }
});
