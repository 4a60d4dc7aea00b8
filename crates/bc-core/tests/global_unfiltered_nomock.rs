//! Process-wide formatter without an owning package.
//!
//! With no owner filter the first frame after `skip` wins, so the default
//! skip must land exactly on the caller of the free function.

use bc_config::FormatterConfig;
use bc_core::{format, global, init_global, CodeOverride};
use tempfile::TempDir;

#[test]
fn default_skip_attributes_caller() {
    let dir = TempDir::new().unwrap();
    let config = FormatterConfig::default().with_destination(dir.path().join("registry.json"));
    assert!(config.package_name.is_none());
    init_global(config).expect("init");

    format("boom", CodeOverride::Derived);
    global().flush();

    let map = global().registry().unwrap().load().unwrap();
    let entry = map.values().next().unwrap();
    assert_eq!(entry.package, "global_unfiltered_nomock");
    assert_eq!(entry.function_name, "default_skip_attributes_caller");
}
