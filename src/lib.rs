//! Fragment identifier parsing and resolution
//!
//! A fragment identifier pinpoints a precise location — a node plus an
//! optional character, temporal, or spatial offset — inside a chain of
//! linked documents (e.g. an e-book package whose spine references
//! separate content documents).
//!
//! # Example identifier
//!
//! ```text
//! identifier(/6/4[chap01]!/4/2/1:5)
//!            │  │        │ │ │ │ └── character offset 5
//!            │  │        │ │ │ └──── step to a text node
//!            │  │        │ │ └────── element step
//!            │  │        │ └──────── element step (body)
//!            │  │        └────────── part boundary (into content doc)
//!            │  └─────────────────── spine item with ID anchor
//!            └────────────────────── spine element
//! ```
//!
//! # Usage
//!
//! ```
//! use fragid::parse;
//!
//! let id = parse("identifier(/6/4[chap01]!/4/2/1:5)").unwrap();
//! assert_eq!(id.parts.len(), 2);
//! assert_eq!(id.parts[0].steps[1].node_id.as_deref(), Some("chap01"));
//! ```
//!
//! Resolution walks a parsed [`Identifier`] against a caller-supplied
//! tree through the [`DocumentTree`] trait; [`XmlTree`] adapts a
//! `roxmltree` document to it:
//!
//! ```
//! use fragid::{parse, ResolveOptions, XmlTree};
//!
//! let doc = roxmltree::Document::parse(
//!     "<html><body><p>don't panic</p></body></html>",
//! ).unwrap();
//! let id = parse("identifier(/1!/1/1/1:4)").unwrap();
//!
//! let location = id.resolve(&XmlTree::new(&doc), ResolveOptions::default()).unwrap();
//! assert_eq!(location.node.text(), Some("don't panic"));
//! assert_eq!(location.offset, Some(4));
//! ```

mod comparator;
mod parser;
mod resolver;
mod sublocation;
mod tree;
mod types;
mod xml;

// Re-export main types
pub use types::{
    Identifier, Part, ResolvedLocation, SideBias, SpatialRange, Step, SubLocation,
};

// Re-export parser functions
pub use parser::{parse, try_parse, ParseError};

// Re-export the resolution surface
pub use resolver::{ResolveError, ResolveOptions};
pub use tree::DocumentTree;
pub use xml::XmlTree;

// Re-export comparator functions
pub use comparator::{compare_identifier_strings, is_after, is_before, is_in_range};
