//! Implicit tag resolution for plain scalars.
//!
//! Follows the YAML 1.2 core schema, plus timestamps and the `<<` merge key,
//! which configuration files still rely on.

use crate::Tag;
use once_cell::sync::Lazy;
use regex::Regex;

static INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+]?[0-9][0-9_]*|0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+)$").unwrap()
});

static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:\.[0-9]+|[0-9][0-9_]*(?:\.[0-9_]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .unwrap()
});

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::?[0-9]{2})?))?)?$",
    )
    .unwrap()
});

/// Resolve the tag a plain (unquoted, untagged) scalar gets from its text.
///
/// ```rust
/// use gencfg_yaml::{resolve_plain, Tag};
///
/// assert_eq!(resolve_plain("8080"), Tag::Int);
/// assert_eq!(resolve_plain("8080/tcp"), Tag::Str);
/// ```
pub fn resolve_plain(value: &str) -> Tag {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return Tag::Null,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return Tag::Bool,
        "<<" => return Tag::Merge,
        _ => {}
    }

    // Cheap reject before running the regexes: every remaining
    // non-string form starts with a digit, a sign or a dot.
    let Some(first) = value.chars().next() else {
        return Tag::Null;
    };
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return Tag::Str;
    }

    if INT.is_match(value) {
        Tag::Int
    } else if FLOAT.is_match(value) {
        Tag::Float
    } else if TIMESTAMP.is_match(value) {
        Tag::Timestamp
    } else {
        Tag::Str
    }
}
