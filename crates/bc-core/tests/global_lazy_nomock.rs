//! Lazily created process-wide formatter.
//!
//! The first `global()` call resolves `BIZCODE_*` settings; nothing calls
//! `init_global` in this binary.

use bc_core::{format, global, CodeOverride};
use tempfile::TempDir;

#[test]
fn lazy_global_follows_environment() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("errors/registry.json");
    std::env::set_var("BIZCODE_REGISTRY", &registry);
    std::env::set_var("BIZCODE_PACKAGE", "global_lazy_nomock");
    std::env::set_var("BIZCODE_SEPARATOR", "|");
    std::env::set_var("BIZCODE_CALL_CHAIN", "true");

    let out = format("boom", CodeOverride::Derived);
    assert!(out.starts_with("|500:"), "unexpected output: {out}");
    assert!(global().config().with_call_chain);
    global().flush();

    let map = global().registry().expect("registry from environment").load().unwrap();
    assert_eq!(map.len(), 1);
    let entry = map.values().next().unwrap();
    assert_eq!(entry.package, "global_lazy_nomock");
    assert_eq!(entry.function_name, "lazy_global_follows_environment");
}
