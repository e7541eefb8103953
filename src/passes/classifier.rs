//! Document classifiers.

use crate::{
    document::Document,
    engine::{DocumentClassifierPass, EngineFeature},
    ir::{IrTree, NodeKind},
    passes::directives::PAGE,
};

/// Kind assigned to documents declaring `@page`
pub const PAGE_DOCUMENT_KIND: &str = "page";
/// Kind assigned when no other classifier claims a document
pub const DEFAULT_DOCUMENT_KIND: &str = "default";

/// Claims documents whose own source declares `@page`.
///
/// A `@page` inherited from an import does not make the importing document a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDocumentClassifierPass;

impl EngineFeature for PageDocumentClassifierPass {
    fn name(&self) -> &'static str {
        "PageDocumentClassifierPass"
    }
}

impl DocumentClassifierPass for PageDocumentClassifierPass {
    fn order(&self) -> i32 {
        100
    }

    fn document_kind(&self) -> &str {
        PAGE_DOCUMENT_KIND
    }

    fn is_match(&self, _document: &Document, ir: &IrTree) -> bool {
        ir.preorder().any(|reference| {
            ir.get(reference.node).is_some_and(|node| {
                matches!(
                    &node.kind,
                    NodeKind::Directive { name, imported: false, .. } if name == PAGE
                )
            })
        })
    }
}

/// Claims every document; registered last.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocumentClassifierPass;

impl EngineFeature for DefaultDocumentClassifierPass {
    fn name(&self) -> &'static str {
        "DefaultDocumentClassifierPass"
    }
}

impl DocumentClassifierPass for DefaultDocumentClassifierPass {
    fn order(&self) -> i32 {
        i32::MAX
    }

    fn document_kind(&self) -> &str {
        DEFAULT_DOCUMENT_KIND
    }

    fn is_match(&self, _document: &Document, _ir: &IrTree) -> bool {
        true
    }
}
