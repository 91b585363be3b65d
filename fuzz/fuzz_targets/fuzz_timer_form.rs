//! Fuzz target: `form::parse_set_timers`
//!
//! Arbitrary POST bodies must either be rejected or produce durations
//! within the whole-second `u32` range.
//!
//! cargo fuzz run fuzz_timer_form

#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_timer::control::form;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = form::parse_set_timers(data) {
        assert!(config.on_secs() <= u64::from(u32::MAX));
        assert!(config.off_secs() <= u64::from(u32::MAX));
        assert_eq!(config.on_duration_ms % 1000, 0);
        assert_eq!(config.off_duration_ms % 1000, 0);
    }
});
