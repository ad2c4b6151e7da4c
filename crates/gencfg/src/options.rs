/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Settings that stay fixed for one expansion run.

use crate::host::{HostProbe, NativeHost};
use crate::ports::PortAllocator;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Options for [`process`](crate::process) and
/// [`expand_field`](crate::expand_field).
///
/// # Example
///
/// ```rust
/// use gencfg::ProcessingOptions;
///
/// let options = ProcessingOptions::new()
///     .root_dir("/srv/app")
///     .argument("env", "staging")
///     .do_not_expand("help_text");
/// assert!(options.is_literal("help_text"));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    root_dir: Option<PathBuf>,
    arguments: BTreeMap<String, String>,
    literal_fields: HashSet<String>,
    testing: bool,
    host: Arc<dyn HostProbe>,
    ports: Arc<PortAllocator>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            root_dir: None,
            arguments: BTreeMap::new(),
            literal_fields: HashSet::new(),
            testing: false,
            host: Arc::new(NativeHost),
            ports: PortAllocator::global(),
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory exposed as `ProjectDir`. Defaults to the current directory.
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    /// Add one entry to `Arguments`; a repeated name overwrites.
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn arguments<I, K, V>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.arguments
            .extend(arguments.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Never expand values stored under the key `name`.
    pub fn do_not_expand(mut self, name: impl Into<String>) -> Self {
        self.literal_fields.insert(name.into());
        self
    }

    /// Value of `Testing` in templates.
    pub fn testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    pub fn host(mut self, host: Arc<dyn HostProbe>) -> Self {
        self.host = host;
        self
    }

    pub fn ports(mut self, ports: Arc<PortAllocator>) -> Self {
        self.ports = ports;
        self
    }

    /// The configured root directory, or the current directory when none
    /// (or an empty one) was given.
    pub fn resolve_root_dir(&self) -> Result<PathBuf> {
        match &self.root_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => std::env::current_dir().map_err(Error::CurrentDir),
        }
    }

    pub fn get_arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    pub fn is_literal(&self, name: &str) -> bool {
        self.literal_fields.contains(name)
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    pub fn host_probe(&self) -> &dyn HostProbe {
        self.host.as_ref()
    }

    pub fn port_allocator(&self) -> &Arc<PortAllocator> {
        &self.ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProcessingOptions::new();
        assert!(options.get_arguments().is_empty());
        assert!(!options.is_testing());
        assert!(!options.is_literal("anything"));
        assert!(Arc::ptr_eq(options.port_allocator(), &PortAllocator::global()));
    }

    #[test]
    fn test_root_dir_falls_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(ProcessingOptions::new().resolve_root_dir().unwrap(), cwd);
        assert_eq!(
            ProcessingOptions::new().root_dir("").resolve_root_dir().unwrap(),
            cwd
        );
        assert_eq!(
            ProcessingOptions::new()
                .root_dir("/srv/app")
                .resolve_root_dir()
                .unwrap(),
            PathBuf::from("/srv/app")
        );
    }

    #[test]
    fn test_arguments_overwrite() {
        let options = ProcessingOptions::new()
            .argument("env", "dev")
            .arguments([("env", "prod"), ("region", "eu")]);
        assert_eq!(options.get_arguments().get("env").unwrap(), "prod");
        assert_eq!(options.get_arguments().len(), 2);
    }
}
