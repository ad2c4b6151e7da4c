/*
 * paths.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lexical path helpers shared by `joinPath` and the sanitizer.
//!
//! These work on strings and never touch the filesystem, so `..` is
//! collapsed without resolving symlinks.

use std::path::{MAIN_SEPARATOR, is_separator};

/// Shortest path equivalent to `path` by purely lexical processing.
///
/// Repeated separators and `.` components are dropped, `..` removes the
/// preceding component. A `..` directly after the root is dropped, leading
/// `..` components of a relative path are kept. An empty result is `.`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with(is_separator);

    let mut components: Vec<&str> = Vec::new();
    for component in path.split(is_separator) {
        match component {
            "" | "." => {}
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                }
                _ if rooted => {}
                _ => components.push(".."),
            },
            name => components.push(name),
        }
    }

    let separator = MAIN_SEPARATOR.to_string();
    let joined = components.join(&separator);
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{}{}", MAIN_SEPARATOR, joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join path segments with the platform separator and clean the result.
///
/// Empty segments are ignored; joining nothing but empty segments gives an
/// empty string.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|segment| !segment.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join(&MAIN_SEPARATOR.to_string()))
}

/// Replace platform separators with `/`.
pub fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}
