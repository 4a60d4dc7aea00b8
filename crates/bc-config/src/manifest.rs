//! Owning-package discovery from a project manifest.
//!
//! - `go.mod`: the `module` directive
//! - anything else is read as a Cargo manifest: `[lib].name`, falling back to
//!   `[package].name`, with `-` normalized to `_` the way it appears in
//!   symbol paths

use crate::validate::{ConfigError, ConfigResult};
use std::path::Path;

/// Manifest consulted when none is configured.
pub const DEFAULT_MANIFEST: &str = "Cargo.toml";

const GO_MOD: &str = "go.mod";

/// Read a manifest and return the owning package name.
pub fn discover_module_name(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_go_mod = path.file_name().is_some_and(|name| name == GO_MOD);
    let name = if is_go_mod {
        parse_go_mod(&content)
    } else {
        parse_cargo_manifest(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let name = name.ok_or_else(|| ConfigError::MissingModuleName(path.to_path_buf()))?;
    tracing::debug!(manifest = %path.display(), module = %name, "discovered owning package");
    Ok(name)
}

/// Extract the module path from `go.mod` content.
pub fn parse_go_mod(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let mut parts = line.split_whitespace();
        if parts.next() != Some("module") {
            continue;
        }
        let raw = parts.next()?;
        let name = raw.trim_matches(|c| c == '"' || c == '`');
        if name.is_empty() {
            return None;
        }
        return Some(name.to_string());
    }
    None
}

/// Extract the crate name from `Cargo.toml` content.
pub fn parse_cargo_manifest(content: &str) -> Result<Option<String>, toml::de::Error> {
    let manifest: toml::Table = toml::from_str(content)?;
    let name = ["lib", "package"].iter().find_map(|section| {
        manifest
            .get(*section)
            .and_then(|table| table.get("name"))
            .and_then(|name| name.as_str())
    });
    Ok(name.map(|name| name.replace('-', "_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_mod_module_directive() {
        let content = "// header\nmodule github.com/acme/svc/v2 // trailing\n\ngo 1.21\n";
        assert_eq!(
            parse_go_mod(content).as_deref(),
            Some("github.com/acme/svc/v2")
        );
    }

    #[test]
    fn go_mod_quoted_module() {
        assert_eq!(
            parse_go_mod("module \"example.com/m\"\n").as_deref(),
            Some("example.com/m")
        );
    }

    #[test]
    fn go_mod_without_module() {
        assert_eq!(parse_go_mod("go 1.21\nrequire x v1.0.0\n"), None);
        assert_eq!(parse_go_mod("modules foo\n"), None);
    }

    #[test]
    fn cargo_package_name_normalized() {
        let content = "[package]\nname = \"my-app\"\nversion = \"0.1.0\"\n";
        assert_eq!(
            parse_cargo_manifest(content).unwrap().as_deref(),
            Some("my_app")
        );
    }

    #[test]
    fn cargo_lib_name_preferred() {
        let content = "[package]\nname = \"my-app\"\n\n[lib]\nname = \"app_core\"\n";
        assert_eq!(
            parse_cargo_manifest(content).unwrap().as_deref(),
            Some("app_core")
        );
    }

    #[test]
    fn cargo_workspace_manifest_has_no_name() {
        let content = "[workspace]\nmembers = [\"crates/a\"]\n";
        assert_eq!(parse_cargo_manifest(content).unwrap(), None);
    }

    #[test]
    fn cargo_invalid_toml() {
        assert!(parse_cargo_manifest("[package\nname=").is_err());
    }
}
