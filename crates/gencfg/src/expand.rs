/*
 * expand.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::environment::{Values, evaluator};
use crate::options::ProcessingOptions;
use crate::{Error, Result};
use tracing::debug;

/// Render the template `text` stored under the key `name`.
///
/// Every call compiles the template from scratch and gathers a fresh
/// [`Values`] context. The result is the raw rendered text; turning it back
/// into YAML is up to the caller.
///
/// ```rust
/// use gencfg::{ProcessingOptions, StaticHost, expand_field};
/// use std::sync::Arc;
///
/// let options = ProcessingOptions::new()
///     .root_dir("/srv/app")
///     .host(Arc::new(StaticHost::default()));
/// let out = expand_field("dir", "{{ ProjectDir }}/out", &options).unwrap();
/// assert_eq!(out, "/srv/app/out");
/// ```
///
/// # Errors
///
/// [`Error::Expression`] if the text does not compile or fails to render,
/// [`Error::Environment`] if host facts cannot be gathered.
pub fn expand_field(name: &str, text: &str, options: &ProcessingOptions) -> Result<String> {
    let wrap = |source| Error::Expression {
        field: name.to_string(),
        source,
    };

    let env = evaluator(options);
    let template = env.template_from_named_str(name, text).map_err(wrap)?;
    let values = Values::gather(name, options)?;
    let rendered = template.render(&values).map_err(wrap)?;

    debug!(field = name, "expanded field");
    Ok(rendered)
}
