//! Renderer trait: maps node kinds to presentation output.

use std::rc::Rc;

use crate::reconcile::entry::Mounted;
use crate::tree::key::StableKey;
use crate::tree::node::{Block, Element, Node};

/// Presentation layer collaborator.
///
/// Implementations should be pure with respect to reconciliation: the output
/// for a node may depend only on the node, its key, and (for blocks) the
/// children's mounted outputs.
pub trait Renderer {
    /// The rendered artifact (a component handle, a string, a widget box...).
    type Output;

    /// Render a leaf element.
    fn render_element(&mut self, element: &Element, key: Option<&StableKey>) -> Self::Output;

    /// Render a block from its already reconciled children.
    ///
    /// `children` holds visible children in order followed by hidden retained
    /// ones; hidden children must stay mounted but not be displayed.
    fn render_block(&mut self, block: &Block, children: &[Mounted<Self::Output>]) -> Self::Output;

    /// Render a whole subtree without any reconciliation. Every child is
    /// visible and rendered fresh.
    fn render_tree(&mut self, node: &Node) -> Self::Output
    where
        Self: Sized,
    {
        match node {
            Node::Element(element) => self.render_element(element, element.stable_key().as_ref()),
            Node::Block(block) => {
                let children: Vec<Mounted<Self::Output>> = block
                    .children
                    .iter()
                    .map(|child| Mounted::visible(Rc::new(self.render_tree(child)), child.stable_key()))
                    .collect();
                self.render_block(block, &children)
            }
        }
    }
}
