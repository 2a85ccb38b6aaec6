#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the loose-input parsers: must never panic,
    // only return Err on malformed descriptions.
    if let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = cstruct::parse_layout(&doc);
        let _ = cstruct::parse_values(&doc);
    }
});
