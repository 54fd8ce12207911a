//! Fuzz target for declarative definition loading.
//!
//! Any JSON that loads must survive a round trip and drive a validation run
//! over an empty entry without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nxvalidate::{DefinitionSchema, MemoryGroup, NexusValidator, SchemaWalker};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(schema) = DefinitionSchema::from_json(json) else {
        return;
    };

    let reloaded = schema
        .to_json()
        .and_then(|json| DefinitionSchema::from_json(&json))
        .expect("a loaded definition serializes back");
    assert_eq!(reloaded, schema);

    let entry = MemoryGroup::new("entry", schema.entry.nx_class.clone());
    let _ = NexusValidator::new().validate_with(&SchemaWalker::new(schema), &entry);
});
