/*
 * environment.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Variables and functions available to template expressions.

use crate::options::ProcessingOptions;
use crate::{Error, Result, paths};
use minijinja::value::{Rest, ValueKind};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior, escape_formatter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

/// Context a single field is rendered with.
///
/// Gathered fresh for every field so that host facts reflect the moment of
/// expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Values {
    /// Key of the field being expanded
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ProjectDir")]
    pub project_dir: String,
    #[serde(rename = "Arguments")]
    pub arguments: BTreeMap<String, String>,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    /// First IPv4 address of `hostname`, empty when it has none
    #[serde(rename = "IPv4")]
    pub ipv4: String,
    #[serde(rename = "Containerized")]
    pub containerized: bool,
    #[serde(rename = "Testing")]
    pub testing: bool,
    #[serde(rename = "CPUs")]
    pub cpus: usize,
    #[serde(rename = "ARCH")]
    pub arch: String,
    #[serde(rename = "OS")]
    pub os: String,
}

impl Values {
    /// Collect the context for the field `name`.
    ///
    /// # Errors
    ///
    /// [`Error::Environment`] when the hostname cannot be read or resolved,
    /// [`Error::CurrentDir`] when no root directory is set and the current
    /// directory is unavailable.
    pub fn gather(name: &str, options: &ProcessingOptions) -> Result<Values> {
        let host = options.host_probe();
        let hostname = host.hostname().map_err(|source| Error::Environment {
            fact: "hostname",
            source,
        })?;
        let ipv4 = host
            .lookup_ipv4(&hostname)
            .map_err(|source| Error::Environment {
                fact: "IPv4 address",
                source,
            })?
            .map(|ip| ip.to_string())
            .unwrap_or_default();

        Ok(Values {
            name: name.to_string(),
            project_dir: options.resolve_root_dir()?.to_string_lossy().into_owned(),
            arguments: options.get_arguments().clone(),
            hostname,
            ipv4,
            containerized: host.is_containerized(),
            testing: options.is_testing(),
            cpus: host.cpus(),
            arch: host.arch(),
            os: host.os(),
        })
    }
}

/// Evaluator configured for configuration templates.
///
/// Undefined variables are errors, output is never escaped and a trailing
/// newline in the field text survives rendering.
pub(crate) fn evaluator<'source>(options: &ProcessingOptions) -> Environment<'source> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    // booleans print as YAML reads them, not as `True`/`False`
    env.set_formatter(|out, state, value| {
        if value.kind() == ValueKind::Bool {
            write!(out, "{}", value.is_true())?;
            Ok(())
        } else {
            escape_formatter(out, state, value)
        }
    });

    env.add_function("add", |terms: Rest<i64>| {
        terms.iter().try_fold(0i64, |sum, &term| checked(sum.checked_add(term)))
    });
    env.add_function("sub", |a: i64, b: i64| checked(a.checked_sub(b)));
    env.add_function("mul", |factors: Rest<i64>| {
        factors.iter().try_fold(1i64, |product, &factor| checked(product.checked_mul(factor)))
    });
    env.add_function("div", |a: i64, b: i64| checked(a.checked_div(b)));
    env.add_function("mod", |a: i64, b: i64| checked(a.checked_rem(b)));

    env.add_function("joinPath", |segments: Rest<String>| paths::join(&segments.0));

    let ports = Arc::clone(options.port_allocator());
    env.add_function("freeLocalPort", move || {
        ports.free_local_port().map_err(|err| {
            minijinja::Error::new(ErrorKind::InvalidOperation, "unable to find a free local port")
                .with_source(err)
        })
    });

    env
}

/// Integer helpers fail on overflow and division by zero.
fn checked(result: Option<i64>) -> std::result::Result<i64, minijinja::Error> {
    result.ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            "integer overflow or division by zero",
        )
    })
}
