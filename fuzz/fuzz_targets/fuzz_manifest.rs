//! Fuzz target for manifest parsing.
//!
//! Tests that `go.mod` and `Cargo.toml` module-name extraction handles
//! arbitrary input without panicking.

#![no_main]

use bc_config::manifest::{parse_cargo_manifest, parse_go_mod};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_go_mod(content);
        let _ = parse_cargo_manifest(content);
    }
});
