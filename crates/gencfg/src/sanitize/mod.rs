/*
 * sanitize/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag-driven cleanup of decoded configuration records.
//!
//! Fields of a record carry a list of operations:
//!
//! ```rust
//! use gencfg::sanitize::{Sanitize, sanitize};
//!
//! #[derive(Sanitize)]
//! pub struct Storage {
//!     #[gencfg("path_clean")]
//!     pub data_dir: String,
//!     pub mirrors: Vec<Mirror>,
//! }
//!
//! #[derive(Sanitize)]
//! pub struct Mirror {
//!     #[gencfg("path_clean,path_toslash")]
//!     pub root: String,
//! }
//!
//! let mut storage = Storage {
//!     data_dir: "/var/lib//app/./data/".into(),
//!     mirrors: vec![Mirror { root: "a/../b".into() }],
//! };
//! sanitize(&mut storage).unwrap();
//! assert_eq!(storage.data_dir, "/var/lib/app/data");
//! assert_eq!(storage.mirrors[0].root, "b");
//! ```
//!
//! The derive generates a table of the record's visited fields. Options,
//! boxes, vectors, arrays and maps pass the field's operations on to their
//! elements; a nested record uses its own table and ignores the tags on the
//! field that holds it.

mod directive;
mod impls;

pub use directive::{Directive, Operation};
pub use gencfg_derive::Sanitize;

use crate::{SanitizeError, paths};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::trace;

/// Name and tag list of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub tags: &'a str,
}

impl<'a> Field<'a> {
    pub const fn new(name: &'a str, tags: &'a str) -> Self {
        Self { name, tags }
    }
}

/// A value that can be visited by the sanitizer.
pub trait Sanitize {
    /// Apply `field`'s operations to this value or pass them on.
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError>;
}

/// A struct with a generated field table; implemented by `#[derive(Sanitize)]`.
pub trait SanitizeRecord {
    /// Visited fields in declaration order.
    const FIELDS: &'static [Field<'static>];

    fn sanitize_fields(&mut self, sanitizer: &Sanitizer) -> Result<(), SanitizeError>;
}

type TestCall = Box<dyn Fn(&str, &str) -> Result<(), String> + Send + Sync>;

/// Named callbacks for the `test_call=NAME` operation.
///
/// Each callback receives the field name and its current value.
#[derive(Default)]
pub struct TestCalls {
    calls: HashMap<String, TestCall>,
}

impl TestCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.calls.insert(name.into(), Box::new(call));
        self
    }

    fn invoke(&self, name: &str, field: &str, value: &str) -> Result<(), SanitizeError> {
        let call = self
            .calls
            .get(name)
            .ok_or_else(|| SanitizeError::UnknownTestCall {
                name: name.to_string(),
            })?;
        call(field, value).map_err(|message| SanitizeError::TestCall {
            name: name.to_string(),
            field: field.to_string(),
            message,
        })
    }
}

impl fmt::Debug for TestCalls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.calls.keys().collect();
        names.sort();
        f.debug_struct("TestCalls").field("names", &names).finish()
    }
}

/// Runs the operations attached to record fields.
///
/// A default sanitizer skips `test_call` operations; build one
/// [with test calls](Sanitizer::with_test_calls) to run them.
#[derive(Debug, Default)]
pub struct Sanitizer {
    test_calls: Option<TestCalls>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_calls(test_calls: TestCalls) -> Self {
        Self {
            test_calls: Some(test_calls),
        }
    }

    /// Visit every field of `record`.
    pub fn sanitize<T: SanitizeRecord>(&self, record: &mut T) -> Result<(), SanitizeError> {
        trace!(record = std::any::type_name::<T>(), "sanitizing record");
        record.sanitize_fields(self)
    }

    /// Run `field`'s operations on a string value.
    pub fn apply_text(&self, field: &Field<'_>, value: &mut String) -> Result<(), SanitizeError> {
        let directive = Directive::parse(field.tags)?;
        for operation in directive.operations() {
            trace!(field = field.name, operation = operation.name(), "sanitize");
            match operation {
                Operation::PathClean if !value.is_empty() => *value = paths::clean(value),
                Operation::PathAbs if !value.is_empty() => *value = absolute(value)?,
                Operation::PathToSlash if !value.is_empty() => *value = paths::to_slash(value),
                Operation::AssureDirExists if !value.is_empty() => {
                    create_dir_all(Path::new(value.as_str()))?
                }
                Operation::AssureDirExistsForFile => {
                    let parent = Path::new(value.as_str())
                        .parent()
                        .filter(|parent| !parent.as_os_str().is_empty());
                    if let Some(parent) = parent {
                        create_dir_all(parent)?;
                    }
                }
                Operation::TestCall(name) => self.test_call(field, name.as_deref(), value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Run `field`'s operations on a value that is not a string.
    ///
    /// Every operation except a skipped `test_call` is a type mismatch.
    pub fn apply_other(&self, field: &Field<'_>) -> Result<(), SanitizeError> {
        let directive = Directive::parse(field.tags)?;
        let skipped = |operation: &&Operation| {
            matches!(operation, Operation::TestCall(_)) && self.test_calls.is_none()
        };
        match directive.operations().iter().find(|op| !skipped(op)) {
            Some(operation) => Err(SanitizeError::TypeMismatch {
                tag: operation.name().to_string(),
                field: field.name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn test_call(
        &self,
        field: &Field<'_>,
        name: Option<&str>,
        value: &str,
    ) -> Result<(), SanitizeError> {
        let Some(test_calls) = &self.test_calls else {
            return Ok(());
        };
        let name = name.ok_or_else(|| SanitizeError::MissingTestCall {
            field: field.name.to_string(),
        })?;
        test_calls.invoke(name, field.name, value)
    }
}

/// Sanitize `record` with a default [`Sanitizer`].
pub fn sanitize<T: SanitizeRecord>(record: &mut T) -> Result<(), SanitizeError> {
    Sanitizer::new().sanitize(record)
}

fn absolute(path: &str) -> Result<String, SanitizeError> {
    if Path::new(path).is_absolute() {
        return Ok(paths::clean(path));
    }
    let cwd = std::env::current_dir().map_err(|source| SanitizeError::AbsPath {
        path: path.to_string(),
        source,
    })?;
    let cwd = cwd.to_string_lossy();
    Ok(paths::join(&[&*cwd, path]))
}

fn create_dir_all(dir: &Path) -> Result<(), SanitizeError> {
    std::fs::create_dir_all(dir).map_err(|source| SanitizeError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn text(sanitizer: &Sanitizer, tags: &str, value: &str) -> Result<String, SanitizeError> {
        let mut value = value.to_string();
        sanitizer.apply_text(&Field::new("Dir", tags), &mut value)?;
        Ok(value)
    }

    #[test]
    fn test_path_operations() {
        let sanitizer = Sanitizer::new();
        assert_eq!(text(&sanitizer, "path_clean", "a//b/../c/").unwrap(), "a/c");
        assert_eq!(text(&sanitizer, "path_clean", "").unwrap(), "");
        assert_eq!(text(&sanitizer, "path_toslash", "a/b").unwrap(), "a/b");
        assert_eq!(text(&sanitizer, "path_abs", "/x/./y").unwrap(), "/x/y");
        assert_eq!(text(&sanitizer, "path_abs", "").unwrap(), "");
    }

    #[test]
    fn test_path_abs_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let expected = cwd.join("conf").to_string_lossy().into_owned();
        assert_eq!(text(&Sanitizer::new(), "path_abs", "conf/.").unwrap(), expected);
    }

    #[test]
    fn test_assure_dir_exists() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");
        let value = dir.to_string_lossy().into_owned();
        text(&Sanitizer::new(), "assure_dir_exists", &value).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_assure_dir_exists_for_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("logs/app.log");
        text(
            &Sanitizer::new(),
            "assure_dir_exists_for_file",
            &file.to_string_lossy(),
        )
        .unwrap();
        assert!(tmp.path().join("logs").is_dir());
        assert!(!file.exists());
        // no parent directory to create
        text(&Sanitizer::new(), "assure_dir_exists_for_file", "app.log").unwrap();
        text(&Sanitizer::new(), "assure_dir_exists_for_file", "").unwrap();
    }

    #[test]
    fn test_assure_dir_exists_reports_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let value = blocker.join("sub").to_string_lossy().into_owned();
        let err = text(&Sanitizer::new(), "assure_dir_exists", &value).unwrap_err();
        assert!(matches!(err, SanitizeError::Io { path, .. } if path == blocker.join("sub")));
    }

    #[test]
    fn test_test_call_skipped_without_registry() {
        assert_eq!(text(&Sanitizer::new(), "test_call=Nope", "v").unwrap(), "v");
        assert_eq!(text(&Sanitizer::new(), "test_call", "v").unwrap(), "v");
    }

    #[test]
    fn test_test_call_invokes_callback() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let sanitizer = Sanitizer::with_test_calls(TestCalls::new().register(
            "Count",
            move |field, value| {
                assert_eq!((field, value), ("Dir", "v"));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ));
        text(&sanitizer, "test_call=Count,test_call=Count", "v").unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_test_call_errors() {
        let sanitizer = Sanitizer::with_test_calls(
            TestCalls::new().register("Fail", |_, _| Err("boom".to_string())),
        );
        assert!(matches!(
            text(&sanitizer, "test_call", "v").unwrap_err(),
            SanitizeError::MissingTestCall { field } if field == "Dir"
        ));
        assert!(matches!(
            text(&sanitizer, "test_call=Other", "v").unwrap_err(),
            SanitizeError::UnknownTestCall { name } if name == "Other"
        ));
        assert!(matches!(
            text(&sanitizer, "test_call=Fail", "v").unwrap_err(),
            SanitizeError::TestCall { message, .. } if message == "boom"
        ));
    }

    #[test]
    fn test_apply_other() {
        let sanitizer = Sanitizer::new();
        sanitizer.apply_other(&Field::new("Retries", "")).unwrap();
        sanitizer
            .apply_other(&Field::new("Retries", "test_call=Count"))
            .unwrap();
        let err = sanitizer
            .apply_other(&Field::new("Retries", "path_clean"))
            .unwrap_err();
        assert!(matches!(
            err,
            SanitizeError::TypeMismatch { tag, field } if tag == "path_clean" && field == "Retries"
        ));
    }
}
