//! Intermediate representation between syntax and target output.
//!
//! The tree is an arena of [`IrNode`]s addressed by [`NodeId`]. Nodes hold their children but
//! no parent link; the `(parent, position)` pair a walk yields as a [`NodeReference`] is all a
//! pass needs to detach or replace a node afterwards.
//!
//! # Walking and Rewriting
//!
//! ```rust
//! use tagscope::ir::{CollectingVisitor, IrNode, IrTree, NodeKind};
//!
//! let mut tree = IrTree::new();
//! let root = tree.root();
//! tree.add_child(root, IrNode::new(NodeKind::Directive {
//!     name: "page".into(),
//!     tokens: Vec::new(),
//!     imported: false,
//! }))?;
//! tree.add_child(root, IrNode::new(NodeKind::HtmlContent { content: "<p>".into() }))?;
//!
//! let mut directives = CollectingVisitor::new(NodeKind::is_directive);
//! tree.walk(&mut directives);
//! tree.remove_all(&directives.references)?;
//!
//! assert_eq!(tree.preorder().count(), 1);
//! # Ok::<(), tagscope::Error>(())
//! ```

mod node;
mod tree;

pub use node::{HtmlAttribute, IrNode, NodeId, NodeKind, NodeReference, TagHelperProperty, TagMode};
pub use tree::{CollectingVisitor, IrTree, PreorderIter, Visitor};
