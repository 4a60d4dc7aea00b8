//! Fuzz target for registry file contents.
//!
//! A registry file may be edited by hand or truncated by a crash; reading
//! and recording against it must return errors, never panic.

#![no_main]

use bc_common::{BusinessCode, RegistryEntry, RegistryMap};
use bc_core::RegistryStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<RegistryMap>(data);

    let Ok(dir) = tempfile_dir() else {
        return;
    };
    let path = dir.join("registry.json");
    if std::fs::write(&path, data).is_err() {
        return;
    }
    let store = RegistryStore::new(&path);
    let _ = store.load();
    let _ = store.record(RegistryEntry::new(BusinessCode::from("001002003"), "pkg", "f", 3));
    let _ = std::fs::remove_dir_all(&dir);
});

fn tempfile_dir() -> std::io::Result<std::path::PathBuf> {
    let dir = std::env::temp_dir().join(format!("bizcode-fuzz-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
