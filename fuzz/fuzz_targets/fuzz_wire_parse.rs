//! Fuzz target for formatted error strings.
//!
//! Parsing must never panic, and anything that parses must re-format to a
//! string that parses to the same parts.

#![no_main]

use bc_common::parse_wire;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for separator in ['#', '|'] {
        if let Ok(parsed) = parse_wire(input, separator) {
            let again = parse_wire(&parsed.to_wire(separator), separator)
                .expect("re-formatted message parses");
            assert_eq!(again, parsed);
        }
    }
});
