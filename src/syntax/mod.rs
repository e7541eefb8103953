//! Markup syntax: the parser seam and the trees it produces.
//!
//! The pipeline only depends on the [`SyntaxParser`] trait. [`MarkupParser`] is the parser
//! registered by default; engines for other template grammars register their own.

mod cursor;
mod parser;
mod tree;

pub use parser::{MarkupParser, SyntaxParser};
pub use tree::{AttributeSyntax, ElementSyntax, SyntaxNode, SyntaxTree};
