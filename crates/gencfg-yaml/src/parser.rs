//! YAML parser that builds [`Document`] trees from `yaml-rust2` events.

use crate::node::{Document, Kind, Node, NodeId, Style, Tag};
use crate::resolve::resolve_plain;
use crate::Result;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, Scanner, TScalarStyle, TokenType};

/// Parse YAML from a string, producing a [`Document`].
///
/// Only the first document of a multi-document stream is read. A stream
/// without any document produces an empty [`Document`].
///
/// # Example
///
/// ```rust
/// use gencfg_yaml::{parse, Style, Tag};
///
/// let doc = parse("ports: [80, 443]").unwrap();
/// let ports = doc.get(doc.content().unwrap(), "ports").unwrap();
/// assert_eq!(doc.node(ports).tag, Tag::Seq);
/// assert_eq!(doc.node(ports).style, Style::Flow);
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) if the YAML is malformed.
pub fn parse(content: &str) -> Result<Document> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = DocumentBuilder::new(content);

    parser.load(&mut builder, false)?; // false = single document only

    Ok(builder.finish())
}

/// Parse YAML from raw bytes, which must be UTF-8.
///
/// # Errors
///
/// Returns [`Error::Encoding`](crate::Error::Encoding) for invalid UTF-8 and
/// [`Error::Parse`](crate::Error::Parse) for malformed YAML.
pub fn parse_bytes(content: &[u8]) -> Result<Document> {
    parse(std::str::from_utf8(content)?)
}

/// Collect anchor names in order of appearance.
///
/// The event API only reports numeric anchor ids, handed out sequentially
/// starting at 1 in the order anchors appear in the token stream. Scanning
/// the same text once more recovers the names the author wrote.
fn anchor_names(content: &str) -> Vec<String> {
    Scanner::new(content.chars())
        .filter_map(|token| match token.1 {
            TokenType::Anchor(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Builder that implements `MarkedEventReceiver` to construct a [`Document`].
struct DocumentBuilder {
    /// Source characters; markers index characters, not bytes
    source: Vec<char>,

    anchors: Vec<String>,

    doc: Document,

    /// Open collections and the document wrapper
    stack: Vec<NodeId>,
}

impl DocumentBuilder {
    fn new(content: &str) -> Self {
        Self {
            source: content.chars().collect(),
            anchors: anchor_names(content),
            doc: Document::new(),
            stack: Vec::new(),
        }
    }

    fn finish(self) -> Document {
        self.doc
    }

    fn anchor(&self, id: usize) -> Option<String> {
        if id == 0 {
            return None;
        }
        Some(
            self.anchors
                .get(id - 1)
                .cloned()
                .unwrap_or_else(|| format!("anchor{}", id)),
        )
    }

    /// Flow collections start with their opening bracket; block ones
    /// start at their first key or entry indicator.
    fn collection_style(&self, marker: &Marker, open: char) -> Style {
        match self.source.get(marker.index()) {
            Some(&c) if c == open => Style::Flow,
            _ => Style::Unset,
        }
    }

    fn attach(&mut self, node: Node) -> NodeId {
        let id = self.doc.push(node);
        if let Some(&parent) = self.stack.last() {
            self.doc.node_mut(parent).children.push(id);
        }
        id
    }
}

fn scalar_style(style: TScalarStyle) -> Style {
    match style {
        TScalarStyle::Plain => Style::Unset,
        TScalarStyle::SingleQuoted => Style::SingleQuoted,
        TScalarStyle::DoubleQuoted => Style::DoubleQuoted,
        TScalarStyle::Literal => Style::Literal,
        TScalarStyle::Folded => Style::Folded,
    }
}

impl MarkedEventReceiver for DocumentBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd => {}

            Event::DocumentStart => {
                let root = self.attach(Node::collection(Kind::Document, Tag::None));
                self.doc.set_root(root);
                self.stack.push(root);
            }

            Event::DocumentEnd
            | Event::SequenceEnd
            | Event::MappingEnd => {
                self.stack.pop();
            }

            Event::Scalar(value, style, anchor_id, tag) => {
                let style = scalar_style(style);
                let tag = match tag {
                    Some(tag) => Tag::from_parts(&tag.handle, &tag.suffix),
                    None if style == Style::Unset => resolve_plain(&value),
                    None => Tag::Str,
                };
                let node = Node::scalar(tag, value)
                    .with_style(style)
                    .with_anchor(self.anchor(anchor_id));
                self.attach(node);
            }

            Event::SequenceStart(anchor_id, tag) => {
                let tag = tag.map_or(Tag::Seq, |tag| Tag::from_parts(&tag.handle, &tag.suffix));
                let node = Node::collection(Kind::Sequence, tag)
                    .with_style(self.collection_style(&marker, '['))
                    .with_anchor(self.anchor(anchor_id));
                let id = self.attach(node);
                self.stack.push(id);
            }

            Event::MappingStart(anchor_id, tag) => {
                let tag = tag.map_or(Tag::Map, |tag| Tag::from_parts(&tag.handle, &tag.suffix));
                let node = Node::collection(Kind::Mapping, tag)
                    .with_style(self.collection_style(&marker, '{'))
                    .with_anchor(self.anchor(anchor_id));
                let id = self.attach(node);
                self.stack.push(id);
            }

            Event::Alias(anchor_id) => {
                let mut node = Node::collection(Kind::Alias, Tag::None);
                node.value = self.anchor(anchor_id).unwrap_or_default();
                self.attach(node);
            }
        }
    }
}
