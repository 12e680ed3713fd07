//! Document tree access
//!
//! Resolution never touches a concrete DOM; it works against this
//! capability trait and callers adapt whatever tree type they hold.
//! [`crate::XmlTree`] ships as the adapter for `roxmltree` documents.

/// Read-only view of a document tree during resolution
///
/// The tree must stay consistent for the duration of a resolution
/// call; nothing here locks or mutates. Child iteration order must be
/// stable and cover *all* node kinds, not just elements — identifier
/// step indexes count text and comment nodes too.
pub trait DocumentTree {
    /// Handle to a node in the tree
    type Node: Clone;

    /// The document node itself (the parent of the top-level elements)
    fn root(&self) -> Self::Node;

    /// The designated top-level container element of the collection
    /// (e.g. `<package>`), the starting point for the first part of an
    /// identifier
    fn container_root(&self) -> Option<Self::Node>;

    /// Element carrying the given `id`, if any
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Child at `index` among all children of `node`
    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;

    /// Whether `node` is an element (as opposed to text, comments, ...)
    fn is_element(&self, node: &Self::Node) -> bool;

    /// Tag name of an element node; `None` for other node kinds.
    /// Callers compare tag names case-insensitively.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    /// Attribute value on an element; `name` may be a qualified name
    /// such as `xlink:href`
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Parent of `node`, if it has one
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// First element-kind child of `node`, the starting point for
    /// non-first identifier parts
    fn first_element_child(&self, node: &Self::Node) -> Option<Self::Node> {
        let mut index = 0;
        while let Some(child) = self.child_at(node, index) {
            if self.is_element(&child) {
                return Some(child);
            }
            index += 1;
        }
        None
    }
}
