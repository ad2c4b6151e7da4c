/*
 * process.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expand every template field of a YAML document.

use crate::expand::expand_field;
use crate::options::ProcessingOptions;
use crate::{Error, Result};
use gencfg_yaml::{Document, NodeId, Style, Tag};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Cheap pre-filter: only strings with something that looks like a
/// `{{ ... }}` expression on one line are handed to the evaluator.
static TEMPLATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*\}\}").unwrap());

/// Expand a YAML template.
///
/// Every string value of a mapping that contains an expression is rendered
/// with [`expand_field`] and the result is parsed as YAML again, so
/// `port: "{{ 8000 + 80 }}"` becomes the integer `8080`. Keys are never
/// expanded, neither are values stored under a
/// [literal](ProcessingOptions::do_not_expand) key. Everything else is
/// written back unchanged.
///
/// ```rust
/// use gencfg::{ProcessingOptions, StaticHost, process};
/// use std::sync::Arc;
///
/// let options = ProcessingOptions::new().host(Arc::new(StaticHost::default()));
/// let out = process(b"{ \"port\": \"{{ 1 + 2 }}\" }", &options).unwrap();
/// assert_eq!(out, b"{\"port\": 3}\n");
/// ```
///
/// # Errors
///
/// [`Error::Parse`] for a malformed template, [`Error::Expression`] or
/// [`Error::Fragment`] naming the first field that failed. No output is
/// produced on error.
pub fn process(raw: &[u8], options: &ProcessingOptions) -> Result<Vec<u8>> {
    let mut doc = gencfg_yaml::parse_bytes(raw)?;
    let Some(root) = doc.root() else {
        debug!("template is empty");
        return Ok(Vec::new());
    };

    let parsed_nodes = doc.len();
    let mut walker = Walker {
        options,
        expanded: 0,
    };
    walker.visit(&mut doc, root)?;

    debug!(
        nodes = parsed_nodes,
        expanded = walker.expanded,
        total_nodes = doc.len(),
        "processed template"
    );
    Ok(gencfg_yaml::emit(&doc).into_bytes())
}

struct Walker<'a> {
    options: &'a ProcessingOptions,
    expanded: usize,
}

impl Walker<'_> {
    /// Depth-first, children before their parent.
    ///
    /// The child list is copied up front: nodes spliced in by an expansion
    /// are never visited.
    fn visit(&mut self, doc: &mut Document, id: NodeId) -> Result<()> {
        let children = doc.node(id).children.clone();
        let in_mapping = doc.node(id).is_mapping();

        for (position, &child) in children.iter().enumerate() {
            self.visit(doc, child)?;
            if in_mapping && position % 2 == 1 {
                let key = doc.node(children[position - 1]).value.clone();
                self.expand_value(doc, &key, child)?;
            }
        }
        Ok(())
    }

    fn expand_value(&mut self, doc: &mut Document, key: &str, id: NodeId) -> Result<()> {
        let node = doc.node(id);
        if node.tag != Tag::Str
            || !TEMPLATE_PATTERN.is_match(&node.value)
            || self.options.is_literal(key)
        {
            return Ok(());
        }

        debug!(field = key, "expanding field");
        let expanded = expand_field(key, &node.value, self.options)?;
        let fragment = gencfg_yaml::parse(&expanded).map_err(|source| Error::Fragment {
            field: key.to_string(),
            source,
        })?;

        let original_style = doc.node(id).style;
        let fragment_style = doc.splice(id, &fragment);
        let spliced = doc.node_mut(id);
        spliced.style = if fragment_style != Style::Unset {
            fragment_style
        } else if spliced.tag.is_compact_scalar() {
            Style::Flow
        } else {
            original_style
        };

        self.expanded += 1;
        Ok(())
    }
}
