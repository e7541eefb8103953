//! Directive registrations.

use crate::engine::{
    ConfigureParserOptions, DirectiveDescriptor, DirectiveTokenKind, DirectiveUsage,
    EngineFeature, ParserOptionsBuilder,
};

/// `@addTagHelper "pattern, assembly"`
pub const ADD_TAG_HELPER: &str = "addTagHelper";
/// `@removeTagHelper "pattern, assembly"`
pub const REMOVE_TAG_HELPER: &str = "removeTagHelper";
/// `@tagHelperPrefix "prefix"`
pub const TAG_HELPER_PREFIX: &str = "tagHelperPrefix";
/// `@page`
pub const PAGE: &str = "page";

/// Registers the tag helper directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagHelperDirectivesFeature;

impl EngineFeature for TagHelperDirectivesFeature {
    fn name(&self) -> &'static str {
        "TagHelperDirectivesFeature"
    }
}

impl ConfigureParserOptions for TagHelperDirectivesFeature {
    fn configure(&self, builder: &mut ParserOptionsBuilder) {
        builder
            .add_directive(DirectiveDescriptor::single_line(
                ADD_TAG_HELPER,
                DirectiveUsage::FileScopedMultipleOccurring,
                vec![DirectiveTokenKind::String],
            ))
            .add_directive(DirectiveDescriptor::single_line(
                REMOVE_TAG_HELPER,
                DirectiveUsage::FileScopedMultipleOccurring,
                vec![DirectiveTokenKind::String],
            ))
            .add_directive(DirectiveDescriptor::single_line(
                TAG_HELPER_PREFIX,
                DirectiveUsage::FileScopedSinglyOccurring,
                vec![DirectiveTokenKind::String],
            ));
    }
}

/// Registers `@page`, which marks a document as a routable page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDirectiveFeature;

impl EngineFeature for PageDirectiveFeature {
    fn name(&self) -> &'static str {
        "PageDirectiveFeature"
    }
}

impl ConfigureParserOptions for PageDirectiveFeature {
    fn configure(&self, builder: &mut ParserOptionsBuilder) {
        builder.add_directive(DirectiveDescriptor::single_line(
            PAGE,
            DirectiveUsage::FileScopedSinglyOccurring,
            Vec::new(),
        ));
    }
}
