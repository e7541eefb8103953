//! Arena-backed intermediate tree.

use crate::{
    diagnostics::Diagnostic,
    ir::{IrNode, NodeId, NodeKind, NodeReference},
    Error, Result,
};

/// Arena of intermediate nodes rooted in a [`NodeKind::Document`] node.
///
/// Nodes are addressed by [`NodeId`] and never move. Detaching a node removes it from its
/// parent's child list but leaves it in the arena, so ids recorded earlier stay valid; only
/// nodes reachable from the root take part in walks and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrTree {
    nodes: Vec<IrNode>,
    root: NodeId,
}

impl IrTree {
    /// Create a tree holding only an unclassified document root
    #[must_use]
    pub fn new() -> Self {
        IrTree {
            nodes: vec![IrNode::new(NodeKind::Document { kind: None })],
            root: NodeId(0),
        }
    }

    /// The document root
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&IrNode> {
        self.nodes.get(id.0)
    }

    /// Look up a node, failing for foreign ids
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] if `id` is not part of this arena.
    pub fn node(&self, id: NodeId) -> Result<&IrNode> {
        self.nodes.get(id.0).ok_or(Error::NodeNotFound(id.0))
    }

    /// Mutably look up a node, failing for foreign ids
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] if `id` is not part of this arena.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut IrNode> {
        self.nodes.get_mut(id.0).ok_or(Error::NodeNotFound(id.0))
    }

    /// Children of `id` in document order; empty for foreign ids
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |node| node.children.as_slice())
    }

    /// The document kind set by classification
    #[must_use]
    pub fn document_kind(&self) -> Option<&str> {
        match &self.nodes[self.root.0].kind {
            NodeKind::Document { kind } => kind.as_deref(),
            _ => None,
        }
    }

    /// Set the document kind
    pub fn set_document_kind(&mut self, document_kind: impl Into<String>) {
        if let NodeKind::Document { kind } = &mut self.nodes[self.root.0].kind {
            *kind = Some(document_kind.into());
        }
    }

    /// Append `node` as the last child of `parent`
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] if `parent` is not part of this arena.
    pub fn add_child(&mut self, parent: NodeId, node: IrNode) -> Result<NodeId> {
        let position = self.node(parent)?.children.len();
        self.insert_child(parent, position, node)
    }

    /// Insert `node` into `parent`'s children at `position`
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] if `parent` is not part of this arena, or
    /// [`Error::Configuration`] if `position` is past the end of its children.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        position: usize,
        node: IrNode,
    ) -> Result<NodeId> {
        let child_count = self.node(parent)?.children.len();
        if position > child_count {
            return Err(config_error!(
                "Cannot insert at position {} of node {} with {} children",
                position,
                parent,
                child_count
            ));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.insert(position, id);
        Ok(id)
    }

    /// Attach a diagnostic to a node
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] if `id` is not part of this arena.
    pub fn add_diagnostic(&mut self, id: NodeId, diagnostic: Diagnostic) -> Result<()> {
        self.node_mut(id)?.diagnostics.push(diagnostic);
        Ok(())
    }

    /// Check that `reference` still describes a child slot of this tree
    fn verify(&self, reference: NodeReference) -> Result<()> {
        let parent = self.node(reference.parent)?;
        self.node(reference.node)?;
        if parent.children.get(reference.position) == Some(&reference.node) {
            Ok(())
        } else {
            Err(Error::InvalidNodeReference {
                parent: reference.parent.0,
                node: reference.node.0,
            })
        }
    }

    /// Detach the referenced node from its parent
    ///
    /// # Errors
    /// Returns [`Error::InvalidNodeReference`] if the parent no longer holds the node at the
    /// recorded position.
    pub fn remove(&mut self, reference: NodeReference) -> Result<()> {
        self.verify(reference)?;
        self.nodes[reference.parent.0]
            .children
            .remove(reference.position);
        Ok(())
    }

    /// Detach every referenced node.
    ///
    /// All references are verified first; removals are then applied from the back of each
    /// child list to the front, so recorded positions stay valid while earlier siblings go.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNodeReference`] if any reference does not hold; nothing is
    /// detached in that case.
    pub fn remove_all(&mut self, references: &[NodeReference]) -> Result<()> {
        for reference in references {
            self.verify(*reference)?;
        }

        let mut ordered = references.to_vec();
        ordered.sort_by(|a, b| {
            a.parent
                .cmp(&b.parent)
                .then_with(|| b.position.cmp(&a.position))
        });
        ordered.dedup();

        for reference in ordered {
            self.nodes[reference.parent.0]
                .children
                .remove(reference.position);
        }
        Ok(())
    }

    /// Put `node` into the referenced slot, detaching the previous occupant
    ///
    /// # Errors
    /// Returns [`Error::InvalidNodeReference`] if the reference does not hold.
    pub fn replace(&mut self, reference: NodeReference, node: IrNode) -> Result<NodeId> {
        self.verify(reference)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[reference.parent.0].children[reference.position] = id;
        Ok(id)
    }

    /// Iterate every node reachable from the root in pre-order, root excluded
    #[must_use]
    pub fn preorder(&self) -> PreorderIter<'_> {
        PreorderIter::new(self, self.root)
    }

    /// Iterate every node below `start` in pre-order, `start` excluded
    #[must_use]
    pub fn descendants(&self, start: NodeId) -> PreorderIter<'_> {
        PreorderIter::new(self, start)
    }

    /// Walk the tree in pre-order, handing each reachable node to `visitor`
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_root(self, self.root);
        for reference in self.preorder() {
            visitor.visit(self, reference);
        }
    }

    /// Diagnostics of every node reachable from the root, in document order
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        std::iter::once(self.root)
            .chain(self.preorder().map(|reference| reference.node))
            .flat_map(move |id| self.nodes[id.0].diagnostics.iter())
    }
}

impl Default for IrTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer of a pre-order walk.
///
/// Visitors must not mutate the tree during the walk; they record [`NodeReference`]s and apply
/// changes once [`IrTree::walk`] returns.
pub trait Visitor {
    /// Called once with the root before any other node
    fn visit_root(&mut self, _tree: &IrTree, _root: NodeId) {}

    /// Called for every reachable non-root node, parents before children
    fn visit(&mut self, tree: &IrTree, reference: NodeReference);
}

/// Collects references to every node whose kind satisfies a predicate.
pub struct CollectingVisitor<F> {
    predicate: F,
    /// References collected so far, in document order
    pub references: Vec<NodeReference>,
}

impl<F: FnMut(&NodeKind) -> bool> CollectingVisitor<F> {
    /// Create a visitor collecting nodes matched by `predicate`
    pub fn new(predicate: F) -> Self {
        CollectingVisitor {
            predicate,
            references: Vec::new(),
        }
    }
}

impl<F: FnMut(&NodeKind) -> bool> Visitor for CollectingVisitor<F> {
    fn visit(&mut self, tree: &IrTree, reference: NodeReference) {
        if let Some(node) = tree.get(reference.node) {
            if (self.predicate)(&node.kind) {
                self.references.push(reference);
            }
        }
    }
}

/// Iterative pre-order traversal yielding one [`NodeReference`] per visited node.
pub struct PreorderIter<'t> {
    tree: &'t IrTree,
    stack: Vec<NodeReference>,
}

impl<'t> PreorderIter<'t> {
    fn new(tree: &'t IrTree, start: NodeId) -> Self {
        let mut iter = PreorderIter {
            tree,
            stack: Vec::new(),
        };
        iter.push_children(start);
        iter
    }

    fn push_children(&mut self, parent: NodeId) {
        // Reversed so the first child is popped first
        for (position, node) in self.tree.children(parent).iter().enumerate().rev() {
            self.stack.push(NodeReference {
                parent,
                node: *node,
                position,
            });
        }
    }
}

impl Iterator for PreorderIter<'_> {
    type Item = NodeReference;

    fn next(&mut self) -> Option<Self::Item> {
        let reference = self.stack.pop()?;
        self.push_children(reference.node);
        Some(reference)
    }
}
