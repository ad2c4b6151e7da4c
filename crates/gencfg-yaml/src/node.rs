/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Arena-backed YAML node tree.

use std::collections::HashMap;
use std::fmt;

/// Index of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Structural kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Stream-level wrapper holding exactly one top-level node
    Document,
    Scalar,
    Sequence,
    /// Children alternate key, value, key, value, ...
    Mapping,
    /// Reference to an anchored node; `value` holds the anchor name
    Alias,
}

/// Semantic type of a node.
///
/// Core schema tags are resolved from plain scalar text (see
/// [`resolve_plain`](crate::resolve_plain)); anything else is kept verbatim
/// as [`Tag::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No type: document wrappers and aliases
    None,
    Str,
    Int,
    Float,
    Bool,
    Null,
    Timestamp,
    Binary,
    Merge,
    Seq,
    Map,
    /// Local (`!foo`) or global tag, stored as written after resolution
    Custom(String),
}

/// Prefix that the `!!` shorthand expands to.
pub(crate) const CORE_PREFIX: &str = "tag:yaml.org,2002:";

impl Tag {
    /// Short form of the tag, e.g. `!!str`.
    pub fn as_str(&self) -> &str {
        match self {
            Tag::None => "",
            Tag::Str => "!!str",
            Tag::Int => "!!int",
            Tag::Float => "!!float",
            Tag::Bool => "!!bool",
            Tag::Null => "!!null",
            Tag::Timestamp => "!!timestamp",
            Tag::Binary => "!!binary",
            Tag::Merge => "!!merge",
            Tag::Seq => "!!seq",
            Tag::Map => "!!map",
            Tag::Custom(tag) => tag,
        }
    }

    /// Build a tag from the handle/suffix pair reported by the scanner.
    pub(crate) fn from_parts(handle: &str, suffix: &str) -> Tag {
        if handle == CORE_PREFIX {
            return match suffix {
                "str" => Tag::Str,
                "int" => Tag::Int,
                "float" => Tag::Float,
                "bool" => Tag::Bool,
                "null" => Tag::Null,
                "timestamp" => Tag::Timestamp,
                "binary" => Tag::Binary,
                "merge" => Tag::Merge,
                "seq" => Tag::Seq,
                "map" => Tag::Map,
                other => Tag::Custom(format!("!!{}", other)),
            };
        }
        // A lone `!` is the non-specific tag and forces a string.
        if (handle.is_empty() && suffix == "!") || (handle == "!" && suffix.is_empty()) {
            return Tag::Str;
        }
        Tag::Custom(format!("{}{}", handle, suffix))
    }

    /// True for the scalar types that legacy consumers expect rendered compactly.
    pub fn is_compact_scalar(&self) -> bool {
        matches!(self, Tag::Bool | Tag::Null | Tag::Int | Tag::Float)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formatting hint used when the tree is serialized again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Plain scalar, block collection
    #[default]
    Unset,
    /// Flow collection (`[a, b]`, `{a: b}`) or compact plain scalar
    Flow,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar
    Literal,
    /// `>` block scalar
    Folded,
}

/// One element of a parsed YAML tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Kind,
    pub tag: Tag,
    /// Scalar text; anchor name for aliases; empty for collections
    pub value: String,
    pub children: Vec<NodeId>,
    pub style: Style,
    pub anchor: Option<String>,
}

impl Node {
    /// A scalar node with the given tag and text.
    pub fn scalar(tag: Tag, value: impl Into<String>) -> Self {
        Self {
            kind: Kind::Scalar,
            tag,
            value: value.into(),
            children: Vec::new(),
            style: Style::Unset,
            anchor: None,
        }
    }

    /// An empty collection of the given kind.
    pub fn collection(kind: Kind, tag: Tag) -> Self {
        Self {
            kind,
            tag,
            value: String::new(),
            children: Vec::new(),
            style: Style::Unset,
            anchor: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_anchor(mut self, anchor: Option<String>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == Kind::Scalar
    }

    pub fn is_mapping(&self) -> bool {
        self.kind == Kind::Mapping
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == Kind::Sequence
    }
}

/// A parsed YAML document.
///
/// Owns every node of the tree. The root, when present, is a
/// [`Kind::Document`] node whose single child is the top-level value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node to the arena without attaching it anywhere.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The document wrapper node, if the stream contained a document.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// The top-level value, with the document wrapper unwrapped.
    pub fn content(&self) -> Option<NodeId> {
        let root = self.root?;
        let node = self.node(root);
        match node.kind {
            Kind::Document => node.children.first().copied(),
            _ => Some(root),
        }
    }

    /// Look up the value stored under a scalar key of a mapping node.
    pub fn get(&self, mapping: NodeId, key: &str) -> Option<NodeId> {
        let node = self.node(mapping);
        if !node.is_mapping() {
            return None;
        }
        node.children
            .chunks(2)
            .find(|pair| self.node(pair[0]).value == key)
            .and_then(|pair| pair.get(1).copied())
    }

    /// Replace the content of `target` with the top-level node of `fragment`.
    ///
    /// The fragment's nodes are copied into this arena; `target` keeps its id
    /// and takes over kind, tag, value and children. `target` keeps its own
    /// anchor unless the fragment's top-level node brings one, so aliases
    /// elsewhere in the document stay valid. Anchors coming from the
    /// fragment are renamed when they clash with anchors already in this
    /// document. An empty fragment turns `target` into a null scalar.
    ///
    /// Styles are not copied: the fragment's own style is returned so the
    /// caller can decide how the spliced node should be rendered.
    pub fn splice(&mut self, target: NodeId, fragment: &Document) -> Style {
        let Some(source) = fragment.content() else {
            let node = self.node_mut(target);
            node.kind = Kind::Scalar;
            node.tag = Tag::Null;
            node.value.clear();
            node.children.clear();
            return Style::Unset;
        };

        let mut renamed = HashMap::new();
        let src = fragment.node(source);
        let anchor = src
            .anchor
            .as_deref()
            .map(|name| self.fresh_anchor(name, &mut renamed));
        let children: Vec<NodeId> = src
            .children
            .iter()
            .map(|&child| self.graft(fragment, child, &mut renamed))
            .collect();
        let value = match src.kind {
            Kind::Alias => renamed.get(&src.value).cloned().unwrap_or_else(|| src.value.clone()),
            _ => src.value.clone(),
        };

        let node = self.node_mut(target);
        node.kind = src.kind;
        node.tag = src.tag.clone();
        node.value = value;
        node.children = children;
        if anchor.is_some() {
            node.anchor = anchor;
        }
        src.style
    }

    fn graft(
        &mut self,
        fragment: &Document,
        id: NodeId,
        renamed: &mut HashMap<String, String>,
    ) -> NodeId {
        let src = fragment.node(id);
        let anchor = src
            .anchor
            .as_deref()
            .map(|name| self.fresh_anchor(name, renamed));
        let value = match src.kind {
            Kind::Alias => renamed.get(&src.value).cloned().unwrap_or_else(|| src.value.clone()),
            _ => src.value.clone(),
        };
        let children = src
            .children
            .iter()
            .map(|&child| self.graft(fragment, child, renamed))
            .collect();
        self.push(Node {
            kind: src.kind,
            tag: src.tag.clone(),
            value,
            children,
            style: src.style,
            anchor,
        })
    }

    fn fresh_anchor(&self, name: &str, renamed: &mut HashMap<String, String>) -> String {
        let taken = |candidate: &str| {
            self.nodes
                .iter()
                .any(|node| node.anchor.as_deref() == Some(candidate))
                || renamed.values().any(|used| used == candidate)
        };
        let mut candidate = name.to_string();
        let mut n = 2;
        while taken(&candidate) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        renamed.insert(name.to_string(), candidate.clone());
        candidate
    }
}
