#![no_main]

use libfuzzer_sys::fuzz_target;
use traf2000::core::MemorySink;
use traf2000::import::{ImportOptions, import_xml, validate_schema};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine, panics are bugs.
        let _ = validate_schema(s);
        let _ = import_xml(s, &ImportOptions::default(), &mut MemorySink::new());
    }
});
