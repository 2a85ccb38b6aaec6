#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parse a whole document and run it through pack. Total size is
    // capped so the fuzzer cannot request absurd buffers.
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let (Some(layout_desc), Some(values_desc)) = (doc.get("layout"), doc.get("values")) else {
        return;
    };
    let (Ok(layout), Ok(values)) = (
        cstruct::parse_layout(layout_desc),
        cstruct::parse_values(values_desc),
    ) else {
        return;
    };
    let size = doc.get("size").and_then(|s| s.as_u64()).unwrap_or(0).min(1 << 20) as usize;
    if let Ok((_, handles)) = cstruct::pack(&values, &layout, size) {
        for h in handles {
            let _ = cstruct::free(h.address);
        }
    }
});
