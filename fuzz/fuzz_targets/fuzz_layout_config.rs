#![no_main]

use libfuzzer_sys::fuzz_target;
use plotgrid_layout::{LayoutConfig, build_snapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let parsed = if text.trim_start().starts_with('{') {
        LayoutConfig::from_json_str(text)
    } else {
        LayoutConfig::from_toml_str(text)
    };
    let Ok(config) = parsed else {
        return;
    };
    // Bound the work per input.
    if config.assignments.len() > 512 {
        return;
    }

    let Ok(snapshot) = build_snapshot(&config, 1) else {
        return;
    };
    for entry in snapshot.entries() {
        assert!(entry.position.is_finite());
        assert_eq!(snapshot.position_of(entry.coord), Some(entry.position));
        assert!(snapshot.cluster_of(entry.coord).is_some());
    }
});
