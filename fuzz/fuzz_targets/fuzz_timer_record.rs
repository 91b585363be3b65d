//! Fuzz target: `record::decode`
//!
//! Feeds arbitrary flash contents into the timer record decoder. It must
//! never panic, and any record it accepts must survive a rewrite unchanged.
//!
//! cargo fuzz run fuzz_timer_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_timer::record;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = record::decode(data) {
        let rec = record::encode(&config);
        assert_eq!(record::decode(rec.as_bytes()), Ok(config));
    }
});
