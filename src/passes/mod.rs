//! The default features.
//!
//! [`default_features`] is what [`crate::Engine::create`] registers:
//!
//! | Feature | Capability | Order |
//! |---|---|---|
//! | [`MarkupParser`] | syntax parser | |
//! | [`TagHelperDirectivesFeature`] | parser options | |
//! | [`PageDirectiveFeature`] | parser options | |
//! | [`PageDocumentClassifierPass`] | document classifier | 100 |
//! | [`DefaultDocumentClassifierPass`] | document classifier | `i32::MAX` |
//! | [`TagHelperBinderPass`] | directive classifier | 100 |
//! | [`DirectiveRemovalPass`] | optimization | 50 |
//! | [`LiteralMergePass`] | optimization | 100 |
//! | [`RenderTargetWriter`] | target writer | |

mod classifier;
mod directives;
mod optimization;
mod tag_helpers;
mod writer;

pub use classifier::{
    DefaultDocumentClassifierPass, PageDocumentClassifierPass, DEFAULT_DOCUMENT_KIND,
    PAGE_DOCUMENT_KIND,
};
pub use directives::{
    PageDirectiveFeature, TagHelperDirectivesFeature, ADD_TAG_HELPER, PAGE, REMOVE_TAG_HELPER,
    TAG_HELPER_PREFIX,
};
pub use optimization::{DirectiveRemovalPass, LiteralMergePass};
pub use tag_helpers::TagHelperBinderPass;
pub use writer::RenderTargetWriter;

use crate::{engine::Feature, syntax::MarkupParser};

/// The features every default engine starts with, in registration order
#[must_use]
pub fn default_features() -> Vec<Feature> {
    vec![
        Feature::syntax_parser(MarkupParser::new()),
        Feature::parser_options(TagHelperDirectivesFeature),
        Feature::parser_options(PageDirectiveFeature),
        Feature::document_classifier(PageDocumentClassifierPass),
        Feature::document_classifier(DefaultDocumentClassifierPass),
        Feature::directive_classifier(TagHelperBinderPass),
        Feature::optimization(DirectiveRemovalPass),
        Feature::optimization(LiteralMergePass),
        Feature::target_writer(RenderTargetWriter),
    ]
}
