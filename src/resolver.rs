//! Resolution engine
//!
//! Walks a parsed [`Identifier`] against a caller-supplied
//! [`DocumentTree`] to locate the target node, and extracts the link
//! URI of the document a non-terminal part steps into.
//!
//! Resolution prefers ID anchors: steps are scanned backwards for an
//! ID that exists in the tree, and traversal resumes from that node
//! instead of index-walking all the way from the root. ID anchors
//! survive structural drift that breaks pure index paths; the
//! `ignore_ids` option disables the shortcut.

use thiserror::Error;
use tracing::{debug, trace};

use crate::tree::DocumentTree;
use crate::types::{Identifier, ResolvedLocation};

/// Resolution options
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Skip ID anchors and walk child indexes from the root
    pub ignore_ids: bool,
}

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The part index does not reference a non-terminal part boundary
    #[error("part index {0} is out of bounds for link resolution")]
    IndexOutOfBounds(usize),

    /// The identifier has no part at the given index
    #[error("identifier has no part at index {0}")]
    MissingPart(usize),

    /// No usable starting node in the supplied tree
    #[error("document is incompatible with this identifier")]
    DocumentIncompatible,

    /// An indexed child does not exist
    #[error("identifier did not match any node in this document")]
    NodeResolution,

    /// A link-bearing element lacks a required attribute
    #[error("<{tag}> element is missing '{attribute}' attribute")]
    MissingAttribute { tag: String, attribute: String },

    /// An ID reference points at nothing
    #[error("no element with id '{0}' in this document")]
    ReferenceNotFound(String),
}

impl Identifier {
    /// Resolve the node addressed by the part at `part_index`
    ///
    /// For the first part the walk starts at the tree's container
    /// element; for later parts the caller supplies the document that
    /// part addresses and the walk starts at its first element child.
    pub fn resolve_node<T: DocumentTree>(
        &self,
        part_index: usize,
        tree: &T,
        options: ResolveOptions,
    ) -> Result<T::Node, ResolveError> {
        let part = self
            .parts
            .get(part_index)
            .ok_or(ResolveError::MissingPart(part_index))?;

        let mut node = if part_index == 0 {
            tree.container_root()
        } else {
            tree.first_element_child(&tree.root())
        }
        .ok_or(ResolveError::DocumentIncompatible)?;

        // Scan backwards for the deepest step whose ID anchor exists
        // in this tree; traversal resumes one step past it
        let mut start_from = 0;
        if !options.ignore_ids {
            for (i, step) in part.steps.iter().enumerate().rev() {
                if let Some(id) = step.node_id.as_deref() {
                    if let Some(anchor) = tree.element_by_id(id) {
                        trace!(step = i, id, "resuming traversal from ID anchor");
                        node = anchor;
                        start_from = i + 1;
                        break;
                    }
                }
            }
        }

        for step in &part.steps[start_from..] {
            // a step without an index (including the zero-index case)
            // can only be reached through its anchor
            node = step
                .node_index
                .and_then(|index| tree.child_at(&node, index as usize - 1))
                .ok_or(ResolveError::NodeResolution)?;
        }

        Ok(node)
    }

    /// Extract the URI of the document the part after `part_index`
    /// addresses
    ///
    /// `part_index` must reference a non-terminal part. The node it
    /// resolves to must be a link-bearing element; an element that is
    /// not one yields `Ok(None)`.
    pub fn resolve_uri<T: DocumentTree>(
        &self,
        part_index: usize,
        tree: &T,
        options: ResolveOptions,
    ) -> Result<Option<String>, ResolveError> {
        if part_index + 1 >= self.parts.len() {
            return Err(ResolveError::IndexOutOfBounds(part_index));
        }

        let node = self.resolve_node(part_index, tree, options)?;
        let Some(tag) = tree.tag_name(&node) else {
            return Ok(None);
        };
        let tag = tag.to_ascii_lowercase();

        let uri = match tag.as_str() {
            "itemref" => {
                let in_spine = tree
                    .parent(&node)
                    .and_then(|parent| tree.tag_name(&parent))
                    .is_some_and(|parent_tag| parent_tag.eq_ignore_ascii_case("spine"));
                if !in_spine {
                    return Ok(None);
                }

                let idref = tree.attribute(&node, "idref").ok_or_else(|| {
                    ResolveError::MissingAttribute {
                        tag: tag.clone(),
                        attribute: "idref".into(),
                    }
                })?;
                let item = tree
                    .element_by_id(&idref)
                    .ok_or(ResolveError::ReferenceNotFound(idref))?;
                tree.attribute(&item, "href")
                    .ok_or_else(|| ResolveError::MissingAttribute {
                        tag: "item".into(),
                        attribute: "href".into(),
                    })?
            }
            "iframe" | "embed" => self.link_attribute(tree, &node, &tag, "src")?,
            "object" => self.link_attribute(tree, &node, &tag, "data")?,
            "image" | "use" => self.link_attribute(tree, &node, &tag, "xlink:href")?,
            _ => return Ok(None),
        };

        debug!(part = part_index, uri = %uri, "resolved link URI");
        Ok(Some(uri))
    }

    fn link_attribute<T: DocumentTree>(
        &self,
        tree: &T,
        node: &T::Node,
        tag: &str,
        attribute: &str,
    ) -> Result<String, ResolveError> {
        tree.attribute(node, attribute)
            .ok_or_else(|| ResolveError::MissingAttribute {
                tag: tag.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Resolve the final part against the document it addresses,
    /// yielding the target node plus the offset and side bias of the
    /// terminal step
    pub fn resolve<T: DocumentTree>(
        &self,
        tree: &T,
        options: ResolveOptions,
    ) -> Result<ResolvedLocation<T::Node>, ResolveError> {
        let part_index = self
            .parts
            .len()
            .checked_sub(1)
            .ok_or(ResolveError::MissingPart(0))?;
        let node = self.resolve_node(part_index, tree, options)?;

        let sub = self.sub_location();
        Ok(ResolvedLocation {
            node,
            offset: sub.and_then(|s| s.offset),
            side_bias: sub.and_then(|s| s.side_bias),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::types::SideBias;
    use crate::xml::XmlTree;

    // Documents are written without inter-element whitespace so that
    // child ordinals are predictable: step indexes count every child
    // node, text included.

    const PACKAGE: &str = "<package>\
        <manifest>\
        <item id=\"intro\" href=\"intro.xhtml\"/>\
        <item id=\"ch1\" href=\"ch1.xhtml\"/>\
        </manifest>\
        <spine>\
        <itemref idref=\"intro\"/>\
        <itemref idref=\"ch1\"/>\
        </spine>\
        </package>";

    const CHAPTER: &str = "<html><body>\
        <p>one</p>\
        <p id=\"target\">two</p>\
        </body></html>";

    #[test]
    fn test_resolve_node_walks_package_from_container() {
        let doc = roxmltree::Document::parse(PACKAGE).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/2/2!/2)").unwrap();

        // /2 = spine (second child of package), /2 = second itemref
        let node = id
            .resolve_node(0, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(node.tag_name().name(), "itemref");
        assert_eq!(node.attribute("idref"), Some("ch1"));
    }

    #[test]
    fn test_resolve_node_missing_container() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1)").unwrap();

        // a content document has no <package> container for part 0
        assert!(matches!(
            id.resolve_node(0, &tree, ResolveOptions::default()),
            Err(ResolveError::DocumentIncompatible)
        ));
    }

    #[test]
    fn test_resolve_node_out_of_range_index() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1/9)").unwrap();

        assert!(matches!(
            id.resolve_node(1, &tree, ResolveOptions::default()),
            Err(ResolveError::NodeResolution)
        ));
    }

    #[test]
    fn test_resolve_node_missing_part() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1)").unwrap();

        assert!(matches!(
            id.resolve_node(5, &tree, ResolveOptions::default()),
            Err(ResolveError::MissingPart(5))
        ));
    }

    #[test]
    fn test_id_anchor_shortcut_vs_full_index_walk() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        // the index path /1/1 lands on the *first* paragraph, but the
        // ID anchor points at the second one
        let id = parse("identifier(/1!/1/1[target])").unwrap();

        let anchored = id
            .resolve_node(1, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(anchored.attribute("id"), Some("target"));
        assert_eq!(anchored.text(), Some("two"));

        let walked = id
            .resolve_node(1, &tree, ResolveOptions { ignore_ids: true })
            .unwrap();
        assert_eq!(walked.attribute("id"), None);
        assert_eq!(walked.text(), Some("one"));
    }

    #[test]
    fn test_id_anchor_resumes_past_the_anchor_step() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        // anchor on an intermediate step; the remaining index steps
        // continue from the anchored node
        let id = parse("identifier(/1!/9/9[target]/1)").unwrap();

        let node = id
            .resolve_node(1, &tree, ResolveOptions::default())
            .unwrap();
        assert!(node.is_text());
        assert_eq!(node.text(), Some("two"));
    }

    #[test]
    fn test_unknown_id_anchor_falls_back_to_index_walk() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1/1[nonexistent])").unwrap();

        let node = id
            .resolve_node(1, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(node.text(), Some("one"));
    }

    #[test]
    fn test_index_less_step_without_anchor_fails() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        // /0 parses to "no index", leaving nothing to walk by
        let id = parse("identifier(/1!/1/0)").unwrap();

        assert!(matches!(
            id.resolve_node(1, &tree, ResolveOptions::default()),
            Err(ResolveError::NodeResolution)
        ));
    }

    #[test]
    fn test_resolve_uri_itemref_chain() {
        let doc = roxmltree::Document::parse(PACKAGE).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/2/2!/2/1:5)").unwrap();

        let uri = id
            .resolve_uri(0, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(uri.as_deref(), Some("ch1.xhtml"));
    }

    #[test]
    fn test_resolve_uri_index_bounds() {
        let doc = roxmltree::Document::parse(PACKAGE).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/2/2!/2)").unwrap();

        // only part 0 references a non-terminal boundary here
        assert!(matches!(
            id.resolve_uri(1, &tree, ResolveOptions::default()),
            Err(ResolveError::IndexOutOfBounds(1))
        ));
    }

    #[test]
    fn test_resolve_uri_itemref_missing_idref() {
        let doc = roxmltree::Document::parse(
            "<package><spine><itemref/></spine></package>",
        )
        .unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1/1!/2)").unwrap();

        match id.resolve_uri(0, &tree, ResolveOptions::default()) {
            Err(ResolveError::MissingAttribute { tag, attribute }) => {
                assert_eq!(tag, "itemref");
                assert_eq!(attribute, "idref");
            }
            other => panic!("expected MissingAttribute, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_uri_itemref_dangling_idref() {
        let doc = roxmltree::Document::parse(
            "<package><spine><itemref idref=\"ghost\"/></spine></package>",
        )
        .unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1/1!/2)").unwrap();

        assert!(matches!(
            id.resolve_uri(0, &tree, ResolveOptions::default()),
            Err(ResolveError::ReferenceNotFound(idref)) if idref == "ghost"
        ));
    }

    #[test]
    fn test_resolve_uri_manifest_item_missing_href() {
        let doc = roxmltree::Document::parse(
            "<package><manifest><item id=\"ch1\"/></manifest>\
             <spine><itemref idref=\"ch1\"/></spine></package>",
        )
        .unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/2/1!/2)").unwrap();

        match id.resolve_uri(0, &tree, ResolveOptions::default()) {
            Err(ResolveError::MissingAttribute { tag, attribute }) => {
                assert_eq!(tag, "item");
                assert_eq!(attribute, "href");
            }
            other => panic!("expected MissingAttribute, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_uri_itemref_outside_spine() {
        let doc = roxmltree::Document::parse(
            "<package><guide><itemref idref=\"x\"/></guide></package>",
        )
        .unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1/1!/2)").unwrap();

        // itemref only carries a link when its parent is <spine>
        let uri = id
            .resolve_uri(0, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(uri, None);
    }

    #[test]
    fn test_resolve_uri_embedded_document_elements() {
        // middle part of a three-part identifier, resolved against a
        // content document holding the embedding element
        let cases = [
            ("<html><body><iframe src=\"a.xhtml\"/></body></html>", "a.xhtml"),
            ("<html><body><embed src=\"b.swf\"/></body></html>", "b.swf"),
            ("<html><body><object data=\"c.svg\"/></body></html>", "c.svg"),
        ];
        for (xml, expected) in cases {
            let doc = roxmltree::Document::parse(xml).unwrap();
            let tree = XmlTree::new(&doc);
            let id = parse("identifier(/1!/1/1!/2)").unwrap();

            let uri = id
                .resolve_uri(1, &tree, ResolveOptions::default())
                .unwrap();
            assert_eq!(uri.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_resolve_uri_embedded_element_missing_attribute() {
        let doc =
            roxmltree::Document::parse("<html><body><iframe/></body></html>").unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1/1!/2)").unwrap();

        match id.resolve_uri(1, &tree, ResolveOptions::default()) {
            Err(ResolveError::MissingAttribute { tag, attribute }) => {
                assert_eq!(tag, "iframe");
                assert_eq!(attribute, "src");
            }
            other => panic!("expected MissingAttribute, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_uri_svg_linking_elements() {
        let xml = "<svg xmlns:xlink=\"http://www.w3.org/1999/xlink\">\
            <image xlink:href=\"cover.png\"/>\
            <use xlink:href=\"shape.svg\"/>\
            </svg>";
        let doc = roxmltree::Document::parse(xml).unwrap();
        let tree = XmlTree::new(&doc);

        let image = parse("identifier(/1!/1!/2)").unwrap();
        let uri = image
            .resolve_uri(1, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(uri.as_deref(), Some("cover.png"));

        let use_el = parse("identifier(/1!/2!/2)").unwrap();
        let uri = use_el
            .resolve_uri(1, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(uri.as_deref(), Some("shape.svg"));
    }

    #[test]
    fn test_resolve_uri_unrecognized_tag() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1/1!/2)").unwrap();

        // <p> is not a link-bearing element
        let uri = id
            .resolve_uri(1, &tree, ResolveOptions::default())
            .unwrap();
        assert_eq!(uri, None);
    }

    #[test]
    fn test_resolve_full_location() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/2/2!/1/2/1:2[;s=b])").unwrap();

        let location = id.resolve(&tree, ResolveOptions::default()).unwrap();
        assert!(location.node.is_text());
        assert_eq!(location.node.text(), Some("two"));
        assert_eq!(location.offset, Some(2));
        assert_eq!(location.side_bias, Some(SideBias::Before));
    }

    #[test]
    fn test_resolve_without_sub_location() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier(/1!/1/1)").unwrap();

        let location = id.resolve(&tree, ResolveOptions::default()).unwrap();
        assert_eq!(location.offset, None);
        assert_eq!(location.side_bias, None);
    }

    #[test]
    fn test_resolve_empty_identifier() {
        let doc = roxmltree::Document::parse(CHAPTER).unwrap();
        let tree = XmlTree::new(&doc);
        let id = parse("identifier()").unwrap();

        assert!(matches!(
            id.resolve(&tree, ResolveOptions::default()),
            Err(ResolveError::MissingPart(0))
        ));
    }

    #[test]
    fn test_package_to_chapter_round_trip() {
        // the full two-document flow: extract the chapter URI from the
        // package, then resolve the rest of the identifier against the
        // chapter it names
        let package = roxmltree::Document::parse(PACKAGE).unwrap();
        let chapter = roxmltree::Document::parse(CHAPTER).unwrap();
        let id = parse("identifier(/2/2!/1/2/1:3)").unwrap();

        let uri = id
            .resolve_uri(0, &XmlTree::new(&package), ResolveOptions::default())
            .unwrap();
        assert_eq!(uri.as_deref(), Some("ch1.xhtml"));

        let location = id
            .resolve(&XmlTree::new(&chapter), ResolveOptions::default())
            .unwrap();
        assert_eq!(location.node.text(), Some("two"));
        assert_eq!(location.offset, Some(3));
    }
}
