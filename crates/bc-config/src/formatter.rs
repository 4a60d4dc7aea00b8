//! Formatter settings.

use bc_common::DEFAULT_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Frames skipped by an instance-scoped formatter (capture + entry point).
pub const DEFAULT_SKIP: usize = 2;

/// Frames skipped by the process-wide formatter by default. Its free
/// functions add one level of indirection.
pub const GLOBAL_SKIP: usize = 3;

/// Upper bound accepted by validation.
pub const MAX_SKIP: usize = 64;

/// Pending registry updates buffered before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Settings for one formatter instance.
///
/// Immutable once the formatter is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Registry file. `None` disables persistence.
    pub destination: Option<PathBuf>,
    /// Single ASCII character delimiting the header.
    pub separator: char,
    /// When false, messages already starting with the separator pass
    /// through unchanged.
    pub with_call_chain: bool,
    /// Stack frames skipped before resolution starts.
    pub skip: usize,
    /// Substring identifying frames owned by the application.
    pub package_name: Option<String>,
    /// Capacity of the asynchronous registry queue.
    pub queue_capacity: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            destination: None,
            separator: DEFAULT_SEPARATOR,
            with_call_chain: false,
            skip: DEFAULT_SKIP,
            package_name: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl FormatterConfig {
    /// Settings for the process-wide default formatter.
    pub fn global_default() -> Self {
        Self::default().for_global()
    }

    /// Adjust instance settings for the process-wide formatter.
    ///
    /// `skip` stays relative to the caller: one frame is added for the
    /// free function sitting between the caller and the formatter.
    pub fn for_global(mut self) -> Self {
        self.skip = self.skip.saturating_add(GLOBAL_SKIP - DEFAULT_SKIP);
        self
    }

    /// Set the registry file. An empty path disables persistence.
    pub fn with_destination(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.destination = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_call_chain(mut self, enabled: bool) -> Self {
        self.with_call_chain = enabled;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Set the owning package. An empty name disables frame filtering.
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.package_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// True when a registry file is configured.
    pub fn persistence_enabled(&self) -> bool {
        self.destination.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FormatterConfig::default();
        assert_eq!(config.separator, '#');
        assert!(!config.with_call_chain);
        assert_eq!(config.skip, DEFAULT_SKIP);
        assert!(config.package_name.is_none());
        assert!(!config.persistence_enabled());
    }

    #[test]
    fn global_default_skips_one_more_frame() {
        assert_eq!(FormatterConfig::global_default().skip, GLOBAL_SKIP);
        assert_eq!(FormatterConfig::default().with_skip(5).for_global().skip, 6);
    }

    #[test]
    fn empty_destination_disables_persistence() {
        let config = FormatterConfig::default().with_destination("");
        assert!(!config.persistence_enabled());
        let config = config.with_destination("errors/registry.json");
        assert_eq!(
            config.destination.as_deref(),
            Some(Path::new("errors/registry.json"))
        );
    }

    #[test]
    fn empty_package_name_is_none() {
        let config = FormatterConfig::default().with_package_name("");
        assert!(config.package_name.is_none());
        let config = config.with_package_name("my_app");
        assert_eq!(config.package_name.as_deref(), Some("my_app"));
    }
}
