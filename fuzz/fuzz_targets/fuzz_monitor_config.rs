//! Fuzz target for monitor.json parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tw_config::{validate_monitor, MonitorConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = MonitorConfig::parse_json(text) {
        let _ = validate_monitor(&config);
    }
});
