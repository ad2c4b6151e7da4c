/*
 * emitter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Serialize a [`Document`] back to YAML text.
//!
//! The emitter honors each node's [`Style`] where the text allows it and
//! falls back to double quotes otherwise. Tags are written only when the
//! chosen rendering would not resolve to the node's tag on its own, so a
//! re-parse yields the same tree.

use crate::node::{Document, Kind, Node, NodeId, Style, Tag};
use crate::resolve::resolve_plain;

const INDENT: usize = 2;

/// Serialize a document to YAML text.
///
/// An empty document produces an empty string; anything else ends with a
/// newline. Comments are not preserved.
pub fn emit(doc: &Document) -> String {
    let mut emitter = Emitter {
        doc,
        out: String::new(),
    };
    if let Some(content) = doc.content() {
        emitter.top_level(content);
    }
    emitter.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Block,
    Flow,
    BlockKey,
    FlowKey,
}

impl Context {
    fn in_flow(self) -> bool {
        matches!(self, Context::Flow | Context::FlowKey)
    }

    fn is_key(self) -> bool {
        matches!(self, Context::BlockKey | Context::FlowKey)
    }
}

struct Emitter<'a> {
    doc: &'a Document,
    out: String,
}

impl<'a> Emitter<'a> {
    fn top_level(&mut self, id: NodeId) {
        let node = self.doc.node(id);
        if is_block_collection(node) {
            let props = self.properties(node, &collection_tag(node));
            if !props.is_empty() {
                self.out.push_str(&props);
                self.out.push('\n');
            }
            self.block_collection(id, 0, false);
        } else if use_block_scalar(node, Context::Block) {
            let props = self.properties(node, &Tag::Str);
            if !props.is_empty() {
                self.out.push_str(&props);
                self.out.push(' ');
            }
            self.block_scalar(&node.value, -1);
        } else {
            let text = self.inline(id, Context::Block);
            self.out.push_str(&text);
            self.out.push('\n');
        }
    }

    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn block_collection(&mut self, id: NodeId, indent: usize, inline_first: bool) {
        match self.doc.node(id).kind {
            Kind::Mapping => self.block_mapping(id, indent, inline_first),
            _ => self.block_sequence(id, indent, inline_first),
        }
    }

    fn block_mapping(&mut self, id: NodeId, indent: usize, inline_first: bool) {
        let doc = self.doc;
        for (i, pair) in doc.node(id).children.chunks(2).enumerate() {
            if i > 0 || !inline_first {
                self.pad(indent);
            }
            let key = self.key(pair[0], Context::BlockKey);
            self.out.push_str(&key);
            self.out.push(':');
            match pair.get(1) {
                Some(&value) => self.block_value(value, indent, false),
                None => self.out.push('\n'),
            }
        }
    }

    fn block_sequence(&mut self, id: NodeId, indent: usize, inline_first: bool) {
        let doc = self.doc;
        for (i, &item) in doc.node(id).children.iter().enumerate() {
            if i > 0 || !inline_first {
                self.pad(indent);
            }
            self.out.push('-');
            self.block_value(item, indent, true);
        }
    }

    /// Write a value that follows `key:` or `-` at column `indent`.
    ///
    /// `compact` lets a property-less block collection start on the same
    /// line, as sequence entries do.
    fn block_value(&mut self, id: NodeId, indent: usize, compact: bool) {
        let node = self.doc.node(id);
        if is_block_collection(node) {
            let props = self.properties(node, &collection_tag(node));
            if compact && props.is_empty() {
                self.out.push(' ');
                self.block_collection(id, indent + INDENT, true);
            } else {
                if !props.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&props);
                }
                self.out.push('\n');
                self.block_collection(id, indent + INDENT, false);
            }
        } else if use_block_scalar(node, Context::Block) {
            let props = self.properties(node, &Tag::Str);
            self.out.push(' ');
            if !props.is_empty() {
                self.out.push_str(&props);
                self.out.push(' ');
            }
            self.block_scalar(&node.value, indent as isize);
        } else {
            let text = self.inline(id, Context::Block);
            self.out.push(' ');
            self.out.push_str(&text);
            self.out.push('\n');
        }
    }

    /// Write a `|` block scalar whose parent sits at column `parent`
    /// (-1 at the top level).
    fn block_scalar(&mut self, value: &str, parent: isize) {
        let content_indent = parent.max(0) as usize + INDENT;
        let (body, chomp) = match value.strip_suffix('\n') {
            Some(stripped) if stripped.ends_with('\n') => (stripped, "+"),
            Some(stripped) => (stripped, ""),
            None => (value, "-"),
        };

        self.out.push('|');
        if value.starts_with(' ') || value.starts_with('\n') {
            let indicator = content_indent as isize - parent;
            self.out.push_str(&indicator.to_string());
        }
        self.out.push_str(chomp);
        self.out.push('\n');

        for line in body.split('\n') {
            if !line.is_empty() {
                self.pad(content_indent);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    fn key(&self, id: NodeId, ctx: Context) -> String {
        let node = self.doc.node(id);
        match node.kind {
            // `*name:` would read the colon as part of the alias
            Kind::Alias => format!("*{} ", node.value),
            Kind::Scalar => self.scalar(node, ctx),
            _ => self.inline(id, Context::Flow),
        }
    }

    fn inline(&self, id: NodeId, ctx: Context) -> String {
        let node = self.doc.node(id);
        match node.kind {
            Kind::Alias => format!("*{}", node.value),
            Kind::Scalar => self.scalar(node, ctx),
            Kind::Mapping => {
                let body = node
                    .children
                    .chunks(2)
                    .map(|pair| {
                        let key = self.key(pair[0], Context::FlowKey);
                        match pair.get(1) {
                            Some(&value) => format!("{}: {}", key, self.inline(value, Context::Flow)),
                            None => format!("{}:", key),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                with_properties(self.properties(node, &Tag::Map), format!("{{{}}}", body))
            }
            Kind::Sequence => {
                let body = node
                    .children
                    .iter()
                    .map(|&item| self.inline(item, Context::Flow))
                    .collect::<Vec<_>>()
                    .join(", ");
                with_properties(self.properties(node, &Tag::Seq), format!("[{}]", body))
            }
            Kind::Document => match node.children.first() {
                Some(&content) => self.inline(content, ctx),
                None => String::new(),
            },
        }
    }

    fn scalar(&self, node: &Node, ctx: Context) -> String {
        let value = if node.tag == Tag::Null && node.value.is_empty() {
            "null"
        } else {
            node.value.as_str()
        };

        let (text, implied) = match node.style {
            Style::SingleQuoted if single_quotable(value) => (single_quote(value), Tag::Str),
            Style::SingleQuoted | Style::DoubleQuoted | Style::Literal | Style::Folded => {
                (double_quote(value), Tag::Str)
            }
            Style::Unset | Style::Flow => {
                let plain = resolve_plain(value);
                let misread_string = node.tag == Tag::Str && plain != Tag::Str;
                if plain_allowed(value, ctx) && !misread_string {
                    (value.to_string(), plain)
                } else {
                    (double_quote(value), Tag::Str)
                }
            }
        };
        with_properties(self.properties(node, &implied), text)
    }

    /// Anchor and tag, space separated; the tag only when it differs from
    /// what the rendering implies.
    fn properties(&self, node: &Node, implied: &Tag) -> String {
        let mut parts = Vec::new();
        if let Some(anchor) = &node.anchor {
            parts.push(format!("&{}", anchor));
        }
        if node.tag != *implied && node.tag != Tag::None {
            parts.push(tag_text(&node.tag));
        }
        parts.join(" ")
    }
}

fn with_properties(props: String, text: String) -> String {
    if props.is_empty() {
        text
    } else {
        format!("{} {}", props, text)
    }
}

fn tag_text(tag: &Tag) -> String {
    match tag {
        Tag::Custom(name) if !name.starts_with('!') => format!("!<{}>", name),
        other => other.as_str().to_string(),
    }
}

fn collection_tag(node: &Node) -> Tag {
    match node.kind {
        Kind::Mapping => Tag::Map,
        _ => Tag::Seq,
    }
}

fn is_block_collection(node: &Node) -> bool {
    matches!(node.kind, Kind::Mapping | Kind::Sequence)
        && node.style != Style::Flow
        && !node.children.is_empty()
}

fn use_block_scalar(node: &Node, ctx: Context) -> bool {
    if node.kind != Kind::Scalar || ctx != Context::Block || node.value.is_empty() {
        return false;
    }
    let wanted = match node.style {
        Style::Literal | Style::Folded => true,
        Style::Unset | Style::Flow => node.tag == Tag::Str && node.value.contains('\n'),
        _ => false,
    };
    wanted
        && !node
            .value
            .chars()
            .any(|c| (c.is_control() && c != '\n' && c != '\t') || c == '\u{feff}')
}

fn plain_allowed(value: &str, ctx: Context) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let second = chars.next();

    if first.is_whitespace() || value.ends_with(char::is_whitespace) {
        return false;
    }
    if value
        .chars()
        .any(|c| c == '\n' || c == '\r' || c == '\u{feff}' || (c.is_control() && c != '\t'))
    {
        return false;
    }
    if value.starts_with("---") || value.starts_with("...") {
        return false;
    }
    match first {
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => return false,
        '-' | '?' | ':' => match second {
            None | Some(' ') | Some('\t') => return false,
            Some(c) if ctx.in_flow() && matches!(c, ',' | '[' | ']' | '{' | '}') => return false,
            _ => {}
        },
        _ => {}
    }
    if value.contains(": ")
        || value.contains(":\t")
        || value.contains(" #")
        || value.contains("\t#")
        || value.ends_with(':')
    {
        return false;
    }
    if ctx.in_flow() && value.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    // keys may not span lines and stay short enough for an implicit key
    !(ctx.is_key() && value.len() > 1024)
}

fn single_quotable(value: &str) -> bool {
    !value.chars().any(|c| c.is_control() || c == '\u{feff}')
}

fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() || c == '\u{feff}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
