/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # gencfg-yaml
//!
//! YAML documents as mutable node trees.
//!
//! This crate parses YAML into a [`Document`]: an arena of [`Node`]s where
//! every node keeps its kind, its resolved type tag (`!!str`, `!!int`, ...),
//! its scalar text, its children and a formatting [`Style`] hint. Nodes can be
//! rewritten in place and the tree serialized back with [`emit`], keeping the
//! quoting and flow/block layout of everything that was not touched.
//!
//! ## Design
//!
//! Nodes live in a flat `Vec` and refer to their children by [`NodeId`].
//! Replacing a subtree never invalidates ids held by a caller that is walking
//! the tree: new content is appended to the arena and the owning slot is
//! rewritten.
//!
//! ## Example
//!
//! ```rust
//! use gencfg_yaml::{emit, parse, Tag};
//!
//! let doc = parse("port: 8080\nname: demo\n").unwrap();
//! let map = doc.content().unwrap();
//! let port = doc.node(map).children[1];
//! assert_eq!(doc.node(port).tag, Tag::Int);
//! assert_eq!(emit(&doc), "port: 8080\nname: demo\n");
//! ```

mod emitter;
mod error;
mod node;
mod parser;
mod resolve;

pub use emitter::emit;
pub use error::{Error, Result};
pub use node::{Document, Kind, Node, NodeId, Style, Tag};
pub use parser::{parse, parse_bytes};
pub use resolve::resolve_plain;
