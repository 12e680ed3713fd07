//! `roxmltree` adapter
//!
//! Implements [`DocumentTree`] on top of a parsed `roxmltree`
//! document, which is how resolution runs against real package and
//! content documents.

use crate::tree::DocumentTree;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// [`DocumentTree`] view over a `roxmltree::Document`
///
/// The container element looked up for the first identifier part
/// defaults to `package`; [`XmlTree::with_container`] overrides it for
/// collections rooted elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct XmlTree<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    container_tag: &'a str,
}

impl<'a, 'input> XmlTree<'a, 'input> {
    pub fn new(doc: &'a roxmltree::Document<'input>) -> Self {
        Self {
            doc,
            container_tag: "package",
        }
    }

    /// Use a different top-level container element
    pub fn with_container(doc: &'a roxmltree::Document<'input>, tag: &'a str) -> Self {
        Self {
            doc,
            container_tag: tag,
        }
    }
}

impl<'a, 'input> DocumentTree for XmlTree<'a, 'input> {
    type Node = roxmltree::Node<'a, 'input>;

    fn root(&self) -> Self::Node {
        self.doc.root()
    }

    fn container_root(&self) -> Option<Self::Node> {
        self.doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == self.container_tag)
    }

    fn element_by_id(&self, id: &str) -> Option<Self::Node> {
        self.doc
            .descendants()
            .find(|n| n.attribute("id") == Some(id))
    }

    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
        node.children().nth(index)
    }

    fn is_element(&self, node: &Self::Node) -> bool {
        node.is_element()
    }

    fn tag_name(&self, node: &Self::Node) -> Option<String> {
        if node.is_element() {
            Some(node.tag_name().name().to_string())
        } else {
            None
        }
    }

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String> {
        if let Some(local) = name.strip_prefix("xlink:") {
            return node
                .attribute((XLINK_NS, local))
                .or_else(|| node.attribute(name))
                .map(str::to_string);
        }
        node.attribute(name).map(str::to_string)
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node> {
        node.parent()
    }
}
