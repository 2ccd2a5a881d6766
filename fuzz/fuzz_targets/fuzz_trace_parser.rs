#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing must not panic; a parsed trace must replay within the bound.
        if let Ok(ops) = memolite::cli::parse_trace(s) {
            if let Ok(mut cache) = memolite::cache::BoundedCache::new(memolite::cache::EvictionPolicy::AccessOrder, 4) {
                let report = memolite::cli::replay(&mut cache, &ops);
                assert!(report.entries.len() <= 4);
            }
        }
    }
});
