#![no_main]

use libfuzzer_sys::fuzz_target;
use traf2000::core::MemorySink;
use traf2000::import::{ImportOptions, import_csv};
use traf2000::traf2000::{Encoder, EncoderConfig, RECORD_WIDTH};

fuzz_target!(|data: &[u8]| {
    let mut sink = MemorySink::new();
    let Ok(imported) = import_csv(data, &ImportOptions::default(), &mut sink) else {
        return;
    };
    // Whatever imports must either encode to full-width records or fail cleanly.
    let encoder = Encoder::new(EncoderConfig::default()).unwrap();
    for invoice in imported.invoices.values() {
        if let Ok(encoded) = encoder.encode(invoice) {
            assert!(encoded.records().iter().all(|r| r.len() == RECORD_WIDTH));
        }
    }
});
