//! Syntax tree produced by a [`crate::syntax::SyntaxParser`].

use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostic, HasDiagnostics},
    document::SourceSpan,
    engine::ParserOptions,
    ir::TagMode,
};

/// An attribute as written in a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSyntax {
    /// Attribute name
    pub name: String,
    /// Unquoted value; `None` for minimized attributes
    pub value: Option<String>,
    /// Location of the whole attribute
    pub span: SourceSpan,
}

/// An element with its attributes and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSyntax {
    /// Tag name as written
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<AttributeSyntax>,
    /// Content between start and end tag
    pub children: Vec<SyntaxNode>,
    /// How the element was written
    pub tag_mode: TagMode,
    /// Location of the start tag
    pub span: SourceSpan,
}

impl Drop for ElementSyntax {
    /// Nested elements are dropped from a worklist, not recursively
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let SyntaxNode::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// A node of the markup syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// Literal text, including comments and unrecognized markup
    Text {
        /// The literal text
        content: String,
        /// Location in the source
        span: SourceSpan,
    },
    /// An element
    Element(ElementSyntax),
    /// An `@expression`
    Expression {
        /// Expression source without `@`
        code: String,
        /// Location in the source
        span: SourceSpan,
    },
    /// A registered `@directive` line
    Directive {
        /// Directive name without `@`
        name: String,
        /// Parsed tokens
        tokens: Vec<String>,
        /// Location in the source
        span: SourceSpan,
    },
}

impl SyntaxNode {
    /// Location of the node
    #[must_use]
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxNode::Text { span, .. }
            | SyntaxNode::Expression { span, .. }
            | SyntaxNode::Directive { span, .. } => *span,
            SyntaxNode::Element(element) => element.span,
        }
    }
}

/// The parsed form of one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    file_path: Option<String>,
    nodes: Vec<SyntaxNode>,
    diagnostics: Vec<Diagnostic>,
    options: Arc<ParserOptions>,
}

impl SyntaxTree {
    /// Create a tree
    #[must_use]
    pub fn new(
        file_path: Option<String>,
        nodes: Vec<SyntaxNode>,
        diagnostics: Vec<Diagnostic>,
        options: Arc<ParserOptions>,
    ) -> Self {
        SyntaxTree {
            file_path,
            nodes,
            diagnostics,
            options,
        }
    }

    /// Path of the parsed file, if any
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Top-level nodes in source order
    #[must_use]
    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    /// The options the tree was parsed with
    #[must_use]
    pub fn options(&self) -> &Arc<ParserOptions> {
        &self.options
    }

    /// Directives at any depth, in source order
    #[must_use]
    pub fn directives(&self) -> Vec<&SyntaxNode> {
        let mut directives = Vec::new();
        let mut pending = vec![self.nodes.iter()];
        while let Some(siblings) = pending.last_mut() {
            match siblings.next() {
                Some(node @ SyntaxNode::Directive { .. }) => directives.push(node),
                Some(SyntaxNode::Element(element)) => pending.push(element.children.iter()),
                Some(_) => {}
                None => {
                    pending.pop();
                }
            }
        }
        directives
    }
}

impl HasDiagnostics for SyntaxTree {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
