/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # gencfg
//!
//! Configuration generation from YAML templates.
//!
//! [`process`] expands the string values of a YAML document that contain
//! `{{ ... }}` expressions and re-types the results, so a template like
//!
//! ```yaml
//! server:
//!   data_dir: "{{ joinPath(ProjectDir, 'data') }}"
//!   port: "{{ freeLocalPort() }}"
//! ```
//!
//! becomes a concrete configuration with a string path and an integer port.
//! Everything that is not a template is written back as it was.
//!
//! The [`sanitize`] module cleans up configuration records after they have
//! been decoded, driven by `#[gencfg("...")]` field attributes.
//!
//! ## Template context
//!
//! Expressions see the fields of [`Values`] (`Name`, `ProjectDir`,
//! `Arguments`, `Hostname`, `IPv4`, `Containerized`, `Testing`, `CPUs`,
//! `ARCH`, `OS`) and, besides the minijinja built-ins, the functions
//! `joinPath(segments...)`, `freeLocalPort()` and the integer helpers
//! `add`, `sub`, `mul`, `div` and `mod`. Expressions use Jinja syntax, so
//! a call is written `add(1, 2)` and a variable `ProjectDir`.

// Lets the derive's `::gencfg::` paths resolve inside this crate too.
extern crate self as gencfg;

mod environment;
mod error;
mod expand;
mod host;
mod options;
pub mod paths;
mod ports;
mod process;
pub mod sanitize;

pub use environment::Values;
pub use error::{Error, Result, SanitizeError};
pub use expand::expand_field;
pub use host::{HostProbe, NativeHost, StaticHost};
pub use options::ProcessingOptions;
pub use ports::{MAX_ATTEMPTS, PortAllocator};
pub use process::process;
