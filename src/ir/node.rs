//! Intermediate node kinds.

use std::{fmt, sync::Arc};

use strum::Display;

use crate::{
    descriptors::TagDescriptor,
    diagnostics::{Diagnostic, HasDiagnostics},
    document::SourceSpan,
};

/// Index of a node inside its [`crate::ir::IrTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw arena index
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an element was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TagMode {
    /// `<p>...</p>`
    StartTagAndEndTag,
    /// `<p />`
    SelfClosing,
    /// `<input>` without an end tag
    StartTagOnly,
}

/// A plain HTML attribute as written on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute value, `None` for minimized attributes like `disabled`
    pub value: Option<String>,
}

/// An element attribute bound to a property of a tag helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperProperty {
    /// The attribute name as written
    pub attribute_name: String,
    /// Name of the descriptor that owns the bound attribute
    pub descriptor_name: String,
    /// Display name of the bound attribute
    pub bound_attribute: String,
    /// Declared value type; the indexer value type for dictionary entries
    pub type_name: String,
    /// `true` if the attribute addressed a dictionary entry
    pub is_indexer: bool,
    /// Attribute value, `None` for minimized attributes
    pub value: Option<String>,
}

/// The payload of an intermediate node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of every tree; `kind` is set by document classification
    Document {
        /// The classified document kind
        kind: Option<String>,
    },
    /// A directive such as `@addTagHelper *, Assembly`
    Directive {
        /// Directive name without `@`
        name: String,
        /// Parsed tokens
        tokens: Vec<String>,
        /// `true` if the directive came from an import
        imported: bool,
    },
    /// Literal markup text
    HtmlContent {
        /// The literal text
        content: String,
    },
    /// An element no tag helper claimed (yet)
    Element {
        /// Tag name as written
        name: String,
        /// Attributes in source order
        attributes: Vec<HtmlAttribute>,
        /// How the element was written
        tag_mode: TagMode,
    },
    /// An element bound to one or more tag helpers
    TagHelper {
        /// Tag name as written, including any prefix
        tag_name: String,
        /// How the element was written
        tag_mode: TagMode,
        /// Binding descriptors in binding order
        descriptors: Vec<Arc<TagDescriptor>>,
        /// Attributes bound to descriptor properties
        properties: Vec<TagHelperProperty>,
        /// Attributes no descriptor claimed
        html_attributes: Vec<HtmlAttribute>,
    },
    /// An `@expression` to be evaluated and written
    Expression {
        /// Expression source
        code: String,
    },
}

impl NodeKind {
    /// Short name of the kind, for logging
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Document { .. } => "Document",
            NodeKind::Directive { .. } => "Directive",
            NodeKind::HtmlContent { .. } => "HtmlContent",
            NodeKind::Element { .. } => "Element",
            NodeKind::TagHelper { .. } => "TagHelper",
            NodeKind::Expression { .. } => "Expression",
        }
    }

    /// `true` for directive nodes
    #[must_use]
    pub fn is_directive(&self) -> bool {
        matches!(self, NodeKind::Directive { .. })
    }
}

/// One arena entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrNode {
    /// Node payload
    pub kind: NodeKind,
    /// Children in document order
    pub(crate) children: Vec<NodeId>,
    /// Diagnostics attached to this node
    pub diagnostics: Vec<Diagnostic>,
    /// Location in the source, if the node came from one
    pub span: Option<SourceSpan>,
}

impl IrNode {
    /// Create a childless node
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        IrNode {
            kind,
            children: Vec::new(),
            diagnostics: Vec::new(),
            span: None,
        }
    }

    /// Attach a source location
    #[must_use]
    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }

    /// Attach diagnostics
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Child ids in document order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl HasDiagnostics for IrNode {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Addresses one child slot of a parent: `parent.children[position] == node`.
///
/// References are recorded during walks and consumed afterwards by
/// [`crate::ir::IrTree::remove`] and [`crate::ir::IrTree::replace`], which verify that the slot
/// still holds the recorded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeReference {
    /// The parent node
    pub parent: NodeId,
    /// The referenced child
    pub node: NodeId,
    /// Index of `node` in the parent's child list
    pub position: usize,
}
