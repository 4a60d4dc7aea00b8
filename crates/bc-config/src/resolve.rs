//! Configuration resolution.
//!
//! Resolution order for each setting: CLI argument → environment variable →
//! config file → built-in default. The owning package additionally falls
//! back to discovery from a project manifest before giving up.

use crate::formatter::FormatterConfig;
use crate::manifest::{discover_module_name, DEFAULT_MANIFEST};
use crate::validate::{validate, validate_separator, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable names.
const ENV_CONFIG: &str = "BIZCODE_CONFIG";
const ENV_REGISTRY: &str = "BIZCODE_REGISTRY";
const ENV_SEPARATOR: &str = "BIZCODE_SEPARATOR";
const ENV_CALL_CHAIN: &str = "BIZCODE_CALL_CHAIN";
const ENV_SKIP: &str = "BIZCODE_SKIP";
const ENV_PACKAGE: &str = "BIZCODE_PACKAGE";
const ENV_MANIFEST: &str = "BIZCODE_MANIFEST";
const ENV_QUEUE_CAPACITY: &str = "BIZCODE_QUEUE_CAPACITY";

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Read from the config file.
    ConfigFile,

    /// Discovered from a project manifest.
    Manifest,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigFile => write!(f, "config file"),
            ConfigSource::Manifest => write!(f, "manifest"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Explicit overrides, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub config_file: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub separator: Option<char>,
    pub with_call_chain: Option<bool>,
    pub skip: Option<usize>,
    pub package: Option<String>,
    pub manifest: Option<PathBuf>,
    pub queue_capacity: Option<usize>,
}

/// On-disk config file (TOML). Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    registry: Option<PathBuf>,
    separator: Option<String>,
    with_call_chain: Option<bool>,
    skip: Option<usize>,
    package: Option<String>,
    manifest: Option<PathBuf>,
    queue_capacity: Option<usize>,
}

/// Source of each resolved setting, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSources {
    pub registry: ConfigSource,
    pub separator: ConfigSource,
    pub with_call_chain: ConfigSource,
    pub skip: ConfigSource,
    pub package: ConfigSource,
    pub queue_capacity: ConfigSource,
}

/// A validated configuration plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub config: FormatterConfig,
    pub sources: ConfigSources,
    pub config_file: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Resolve configuration against the process environment.
pub fn resolve_config(options: &ConfigOptions) -> ConfigResult<ResolvedConfig> {
    resolve_config_with(options, |key| std::env::var(key).ok())
}

/// Resolve configuration with an explicit environment lookup.
pub fn resolve_config_with<F>(options: &ConfigOptions, env: F) -> ConfigResult<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = options
        .config_file
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from));
    let file = match &config_file {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let mut sources = ConfigSources::default();
    let mut config = FormatterConfig::default();

    let registry = pick(
        options.registry.clone(),
        env(ENV_REGISTRY).map(PathBuf::from),
        file.registry.clone(),
        &mut sources.registry,
    );
    if let Some(path) = registry {
        config = config.with_destination(path);
    }

    let env_separator = env(ENV_SEPARATOR)
        .map(|raw| parse_separator(&raw))
        .transpose()?;
    let file_separator = file
        .separator
        .as_deref()
        .map(parse_separator)
        .transpose()?;
    if let Some(sep) = pick(
        options.separator,
        env_separator,
        file_separator,
        &mut sources.separator,
    ) {
        config.separator = sep;
    }

    let env_call_chain = env(ENV_CALL_CHAIN)
        .map(|raw| parse_bool(ENV_CALL_CHAIN, &raw))
        .transpose()?;
    if let Some(enabled) = pick(
        options.with_call_chain,
        env_call_chain,
        file.with_call_chain,
        &mut sources.with_call_chain,
    ) {
        config.with_call_chain = enabled;
    }

    let env_skip = env(ENV_SKIP)
        .map(|raw| parse_usize(ENV_SKIP, &raw))
        .transpose()?;
    if let Some(skip) = pick(options.skip, env_skip, file.skip, &mut sources.skip) {
        config.skip = skip;
    }

    let env_capacity = env(ENV_QUEUE_CAPACITY)
        .map(|raw| parse_usize(ENV_QUEUE_CAPACITY, &raw))
        .transpose()?;
    if let Some(capacity) = pick(
        options.queue_capacity,
        env_capacity,
        file.queue_capacity,
        &mut sources.queue_capacity,
    ) {
        config.queue_capacity = capacity;
    }

    let manifest = options
        .manifest
        .clone()
        .or_else(|| env(ENV_MANIFEST).map(PathBuf::from))
        .or_else(|| file.manifest.clone());
    let package = pick(
        options.package.clone(),
        env(ENV_PACKAGE),
        file.package.clone(),
        &mut sources.package,
    );
    let (package, manifest) = match package {
        Some(name) => (Some(name), manifest),
        None => {
            let path = manifest.unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
            match discover_module_name(&path) {
                Ok(name) => {
                    sources.package = ConfigSource::Manifest;
                    (Some(name), Some(path))
                }
                Err(e) => {
                    tracing::debug!(manifest = %path.display(), error = %e, "owning package not discovered");
                    (None, None)
                }
            }
        }
    };
    if let Some(name) = package {
        config = config.with_package_name(name);
    }

    validate(&config)?;

    Ok(ResolvedConfig {
        config,
        sources,
        config_file,
        manifest,
    })
}

fn pick<T>(
    cli: Option<T>,
    env: Option<T>,
    file: Option<T>,
    source: &mut ConfigSource,
) -> Option<T> {
    if cli.is_some() {
        *source = ConfigSource::CliArgument;
        return cli;
    }
    if env.is_some() {
        *source = ConfigSource::Environment;
        return env;
    }
    if file.is_some() {
        *source = ConfigSource::ConfigFile;
        return file;
    }
    *source = ConfigSource::BuiltinDefault;
    None
}

fn load_file_config(path: &Path) -> ConfigResult<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse a separator given as text. Exactly one ASCII character.
pub fn parse_separator(raw: &str) -> ConfigResult<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => {
            validate_separator(sep)?;
            Ok(sep)
        }
        _ => Err(ConfigError::invalid(
            "separator",
            format!("expected a single character, got {raw:?}"),
        )),
    }
}

fn parse_bool(field: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(
            field,
            format!("expected a boolean, got {raw:?}"),
        )),
    }
}

fn parse_usize(field: &str, raw: &str) -> ConfigResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, format!("expected a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_manifest() -> ConfigOptions {
        ConfigOptions {
            manifest: Some(PathBuf::from("/nonexistent/bizcode/Cargo.toml")),
            ..ConfigOptions::default()
        }
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::ConfigFile), "config file");
        assert_eq!(format!("{}", ConfigSource::Manifest), "manifest");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn defaults_when_nothing_set() {
        let resolved = resolve_config_with(&no_manifest(), env_from(&[])).unwrap();
        assert_eq!(resolved.config, FormatterConfig::default());
        assert_eq!(resolved.sources, ConfigSources::default());
        assert!(resolved.manifest.is_none());
    }

    #[test]
    fn cli_beats_environment() {
        let options = ConfigOptions {
            separator: Some('|'),
            package: Some("cli_pkg".to_string()),
            ..no_manifest()
        };
        let env = env_from(&[(ENV_SEPARATOR, "~"), (ENV_PACKAGE, "env_pkg"), (ENV_SKIP, "4")]);
        let resolved = resolve_config_with(&options, env).unwrap();
        assert_eq!(resolved.config.separator, '|');
        assert_eq!(resolved.sources.separator, ConfigSource::CliArgument);
        assert_eq!(resolved.config.package_name.as_deref(), Some("cli_pkg"));
        assert_eq!(resolved.config.skip, 4);
        assert_eq!(resolved.sources.skip, ConfigSource::Environment);
    }

    #[test]
    fn environment_values_parsed() {
        let env = env_from(&[
            (ENV_REGISTRY, "/tmp/reg.json"),
            (ENV_CALL_CHAIN, "yes"),
            (ENV_QUEUE_CAPACITY, "16"),
        ]);
        let resolved = resolve_config_with(&no_manifest(), env).unwrap();
        assert_eq!(
            resolved.config.destination.as_deref(),
            Some(Path::new("/tmp/reg.json"))
        );
        assert!(resolved.config.with_call_chain);
        assert_eq!(resolved.config.queue_capacity, 16);
    }

    #[test]
    fn invalid_environment_values_rejected() {
        let err = resolve_config_with(&no_manifest(), env_from(&[(ENV_SKIP, "lots")]))
            .unwrap_err();
        assert_eq!(err.code(), 65);

        let err = resolve_config_with(&no_manifest(), env_from(&[(ENV_SEPARATOR, "##")]))
            .unwrap_err();
        assert!(err.to_string().contains("single character"));

        assert!(
            resolve_config_with(&no_manifest(), env_from(&[(ENV_CALL_CHAIN, "maybe")]))
                .is_err()
        );
    }

    #[test]
    fn parse_separator_rules() {
        assert_eq!(parse_separator("#").unwrap(), '#');
        assert!(parse_separator("").is_err());
        assert!(parse_separator(":").is_err());
    }
}
