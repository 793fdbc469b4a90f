#![no_main]

use goir::ir::Data;
use goir::{aggregate, collect_file};
use goir_parser::parse_source;
use libfuzzer_sys::fuzz_target;

// Whatever parses must collect, serialize and decode back unchanged.
fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = parse_source(src) else {
        return;
    };
    let doc = aggregate([collect_file("fuzz.go", &parsed)]);
    let json = serde_json::to_vec(&doc).expect("serialize");
    let back: Data = serde_json::from_slice(&json).expect("decode");
    assert_eq!(back, doc);
    assert_eq!(collect_file("fuzz.go", &parsed), doc.packages[0].files[0]);
});
