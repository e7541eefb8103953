//! Constructors for every diagnostic emitted by the core.
//!
//! Each diagnostic kind is declared once as a [`DiagnosticDescriptor`] constant next to the
//! function that formats its message, so identifiers stay stable and greppable.

use crate::{
    diagnostics::{Diagnostic, DiagnosticDescriptor, Severity},
    document::SourceSpan,
};

// Markup and directive syntax, offset 1000

/// An element start tag was never closed with `>`
pub const PARSING_UNTERMINATED_TAG: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1000", Severity::Error);
/// An element was opened but never closed
pub const PARSING_MISSING_END_TAG: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1001", Severity::Error);
/// An end tag had no matching start tag
pub const PARSING_UNEXPECTED_END_TAG: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1002", Severity::Error);
/// A directive which requires a value had none
pub const PARSING_DIRECTIVE_MUST_HAVE_VALUE: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1003", Severity::Error);
/// A quoted attribute value ran to the end of the input
pub const PARSING_UNTERMINATED_ATTRIBUTE_VALUE: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1004", Severity::Error);
/// `addTagHelper`/`removeTagHelper` text was not `pattern, assembly`
pub const DIRECTIVE_INVALID_LOOKUP_TEXT: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1005", Severity::Error);
/// `tagHelperPrefix` contained a character which cannot start an element name
pub const DIRECTIVE_INVALID_TAG_HELPER_PREFIX: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1006", Severity::Error);
/// An indexer attribute was used without a key after the prefix
pub const BINDING_INDEXER_ATTRIBUTE_MISSING_KEY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1007", Severity::Error);
/// A tag helper declared without end tag was used with one
pub const BINDING_END_TAG_NOT_ALLOWED: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1008", Severity::Error);
/// Two tag helpers bound to one element disagree about its structure
pub const BINDING_INCONSISTENT_TAG_STRUCTURE: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS1009", Severity::Error);

// Semantic checks, offset 2000

/// A singly-occurring directive appeared more than once
pub const DIRECTIVE_DUPLICATE: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS2000", Severity::Error);
/// A child element is not in the parent tag helper's allowed children
pub const BINDING_INVALID_NESTED_TAG: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS2001", Severity::Error);
/// Text content inside a tag helper which only allows specific children
pub const BINDING_CANNOT_HAVE_NON_TAG_CONTENT: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS2002", Severity::Error);
/// A tag helper matched tag and parent but a required attribute was missing
pub const BINDING_UNMATCHED_REQUIRED_ATTRIBUTE: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS2003", Severity::Warning);

// Tag descriptor validation, offset 3000

/// An allowed child name was empty
pub const DESCRIPTOR_INVALID_RESTRICTED_CHILD_EMPTY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3000", Severity::Error);
/// An allowed child name contained an invalid character
pub const DESCRIPTOR_INVALID_RESTRICTED_CHILD: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3001", Severity::Error);
/// A bound attribute name was empty
pub const DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_EMPTY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3002", Severity::Error);
/// A bound attribute name contained an invalid character
pub const DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3003", Severity::Error);
/// A bound attribute name used a reserved prefix
pub const DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME_STARTS_WITH: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3004", Severity::Error);
/// An indexer prefix contained an invalid character
pub const DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3005", Severity::Error);
/// An indexer prefix used a reserved prefix
pub const DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX_STARTS_WITH: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3006", Severity::Error);
/// A targeted tag name was empty
pub const DESCRIPTOR_INVALID_TARGETED_TAG_NAME_EMPTY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3007", Severity::Error);
/// A targeted tag name contained an invalid character
pub const DESCRIPTOR_INVALID_TARGETED_TAG_NAME: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3008", Severity::Error);
/// A targeted parent tag name was empty
pub const DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME_EMPTY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3009", Severity::Error);
/// A targeted parent tag name contained an invalid character
pub const DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3010", Severity::Error);
/// A required attribute name was empty
pub const DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME_EMPTY: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3011", Severity::Error);
/// A required attribute name contained an invalid character
pub const DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME: DiagnosticDescriptor =
    DiagnosticDescriptor::new("TS3012", Severity::Error);

/// Create a [`PARSING_UNTERMINATED_TAG`] diagnostic
#[must_use]
pub fn unterminated_tag(span: SourceSpan, tag_name: &str) -> Diagnostic {
    Diagnostic::new(
        PARSING_UNTERMINATED_TAG,
        Some(span),
        format!("The start tag '<{tag_name}' is missing its closing '>'."),
    )
}

/// Create a [`PARSING_MISSING_END_TAG`] diagnostic
#[must_use]
pub fn missing_end_tag(span: SourceSpan, tag_name: &str) -> Diagnostic {
    Diagnostic::new(
        PARSING_MISSING_END_TAG,
        Some(span),
        format!("The '{tag_name}' element was not closed. All elements must be either self-closing or have a matching end tag."),
    )
}

/// Create a [`PARSING_UNEXPECTED_END_TAG`] diagnostic
#[must_use]
pub fn unexpected_end_tag(span: SourceSpan, tag_name: &str) -> Diagnostic {
    Diagnostic::new(
        PARSING_UNEXPECTED_END_TAG,
        Some(span),
        format!("Encountered end tag '{tag_name}' with no matching start tag."),
    )
}

/// Create a [`PARSING_DIRECTIVE_MUST_HAVE_VALUE`] diagnostic
#[must_use]
pub fn directive_must_have_value(span: SourceSpan, directive: &str) -> Diagnostic {
    Diagnostic::new(
        PARSING_DIRECTIVE_MUST_HAVE_VALUE,
        Some(span),
        format!("Directive '{directive}' must have a value."),
    )
}

/// Create a [`PARSING_UNTERMINATED_ATTRIBUTE_VALUE`] diagnostic
#[must_use]
pub fn unterminated_attribute_value(span: SourceSpan, attribute: &str) -> Diagnostic {
    Diagnostic::new(
        PARSING_UNTERMINATED_ATTRIBUTE_VALUE,
        Some(span),
        format!("The value of attribute '{attribute}' is missing its closing quote."),
    )
}

/// Create a [`DIRECTIVE_INVALID_LOOKUP_TEXT`] diagnostic
#[must_use]
pub fn invalid_tag_helper_lookup_text(span: Option<SourceSpan>, lookup_text: &str) -> Diagnostic {
    Diagnostic::new(
        DIRECTIVE_INVALID_LOOKUP_TEXT,
        span,
        format!("Invalid tag helper directive look up text '{lookup_text}'. The correct look up text format is: \"name, assemblyName\"."),
    )
}

/// Create a [`DIRECTIVE_INVALID_TAG_HELPER_PREFIX`] diagnostic
#[must_use]
pub fn invalid_tag_helper_prefix(
    span: Option<SourceSpan>,
    prefix: &str,
    invalid_character: char,
) -> Diagnostic {
    Diagnostic::new(
        DIRECTIVE_INVALID_TAG_HELPER_PREFIX,
        span,
        format!("Invalid tag helper prefix '{prefix}'. The prefix cannot contain the '{invalid_character}' character."),
    )
}

/// Create a [`BINDING_INDEXER_ATTRIBUTE_MISSING_KEY`] diagnostic
#[must_use]
pub fn indexer_attribute_missing_key(
    span: Option<SourceSpan>,
    attribute: &str,
    tag_name: &str,
) -> Diagnostic {
    Diagnostic::new(
        BINDING_INDEXER_ATTRIBUTE_MISSING_KEY,
        span,
        format!("The tag helper attribute '{attribute}' in element '{tag_name}' is missing a key. The syntax is '<{tag_name} {attribute}{{ key }}=\"value\">'."),
    )
}

/// Create a [`BINDING_END_TAG_NOT_ALLOWED`] diagnostic
#[must_use]
pub fn end_tag_not_allowed(span: Option<SourceSpan>, tag_name: &str) -> Diagnostic {
    Diagnostic::new(
        BINDING_END_TAG_NOT_ALLOWED,
        span,
        format!("Found an end tag (</{tag_name}>) for tag helper '{tag_name}' with tag structure that disallows an end tag ('WithoutEndTag')."),
    )
}

/// Create a [`BINDING_INCONSISTENT_TAG_STRUCTURE`] diagnostic
#[must_use]
pub fn inconsistent_tag_structure(
    span: Option<SourceSpan>,
    first: &str,
    second: &str,
    tag_name: &str,
) -> Diagnostic {
    Diagnostic::new(
        BINDING_INCONSISTENT_TAG_STRUCTURE,
        span,
        format!("Tag helpers '{first}' and '{second}' targeting element '{tag_name}' must not expect different tag structures."),
    )
}

/// Create a [`DIRECTIVE_DUPLICATE`] diagnostic
#[must_use]
pub fn duplicate_directive(span: Option<SourceSpan>, directive: &str) -> Diagnostic {
    Diagnostic::new(
        DIRECTIVE_DUPLICATE,
        span,
        format!("The '{directive}' directive may only occur once per document."),
    )
}

/// Create a [`BINDING_INVALID_NESTED_TAG`] diagnostic
#[must_use]
pub fn invalid_nested_tag(
    span: Option<SourceSpan>,
    child: &str,
    parent: &str,
    allowed: &str,
) -> Diagnostic {
    Diagnostic::new(
        BINDING_INVALID_NESTED_TAG,
        span,
        format!("The <{child}> tag is not allowed by parent <{parent}> tag helper. Only child tags with name(s) '{allowed}' are allowed."),
    )
}

/// Create a [`BINDING_CANNOT_HAVE_NON_TAG_CONTENT`] diagnostic
#[must_use]
pub fn cannot_have_non_tag_content(
    span: Option<SourceSpan>,
    parent: &str,
    allowed: &str,
) -> Diagnostic {
    Diagnostic::new(
        BINDING_CANNOT_HAVE_NON_TAG_CONTENT,
        span,
        format!("The parent <{parent}> tag helper does not allow non-tag content. Only child tag helper(s) targeting tag name(s) '{allowed}' are allowed."),
    )
}

/// Create a [`BINDING_UNMATCHED_REQUIRED_ATTRIBUTE`] diagnostic
#[must_use]
pub fn unmatched_required_attribute(
    span: Option<SourceSpan>,
    descriptor: &str,
    tag_name: &str,
    constraint: &str,
) -> Diagnostic {
    Diagnostic::new(
        BINDING_UNMATCHED_REQUIRED_ATTRIBUTE,
        span,
        format!("Tag helper '{descriptor}' targets element '{tag_name}' but was not applied: the element does not satisfy required attribute {constraint}."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_RESTRICTED_CHILD_EMPTY`] diagnostic
#[must_use]
pub fn invalid_restricted_child_empty(descriptor: &str) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_RESTRICTED_CHILD_EMPTY,
        None,
        format!("Tag helpers cannot restrict child elements that have a null or whitespace tag name: '{descriptor}'."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_RESTRICTED_CHILD`] diagnostic
#[must_use]
pub fn invalid_restricted_child(descriptor: &str, child: &str, invalid: char) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_RESTRICTED_CHILD,
        None,
        format!("Invalid restricted child '{child}' for tag helper '{descriptor}'. Tag helpers cannot restrict child elements that contain a '{invalid}' character."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_EMPTY`] diagnostic
#[must_use]
pub fn invalid_bound_attribute_empty(descriptor: &str, attribute: &str) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_EMPTY,
        None,
        format!("Invalid tag helper bound attribute '{attribute}' on tag helper '{descriptor}'. Tag helpers cannot bind to HTML attributes with a null or empty name."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME`] diagnostic
#[must_use]
pub fn invalid_bound_attribute_name(
    descriptor: &str,
    attribute: &str,
    name: &str,
    invalid: char,
) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME,
        None,
        format!("Invalid tag helper bound attribute '{attribute}' on tag helper '{descriptor}'. Tag helpers cannot bind to HTML attributes with name '{name}' because the name contains a '{invalid}' character."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME_STARTS_WITH`] diagnostic
#[must_use]
pub fn invalid_bound_attribute_name_starts_with(
    descriptor: &str,
    attribute: &str,
    name: &str,
) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_NAME_STARTS_WITH,
        None,
        format!("Invalid tag helper bound attribute '{attribute}' on tag helper '{descriptor}'. Tag helpers cannot bind to HTML attributes with name '{name}' because the name starts with 'data-'."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX`] diagnostic
#[must_use]
pub fn invalid_bound_attribute_prefix(
    descriptor: &str,
    attribute: &str,
    prefix: &str,
    invalid: char,
) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX,
        None,
        format!("Invalid tag helper bound attribute '{attribute}' on tag helper '{descriptor}'. Tag helpers cannot bind to HTML attributes with prefix '{prefix}' because the prefix contains a '{invalid}' character."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX_STARTS_WITH`] diagnostic
#[must_use]
pub fn invalid_bound_attribute_prefix_starts_with(
    descriptor: &str,
    attribute: &str,
    prefix: &str,
) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_BOUND_ATTRIBUTE_PREFIX_STARTS_WITH,
        None,
        format!("Invalid tag helper bound attribute '{attribute}' on tag helper '{descriptor}'. Tag helpers cannot bind to HTML attributes with prefix '{prefix}' because the prefix starts with 'data-'."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_TAG_NAME_EMPTY`] diagnostic
#[must_use]
pub fn invalid_targeted_tag_name_empty() -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_TAG_NAME_EMPTY,
        None,
        "Targeted tag name cannot be null or whitespace.",
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_TAG_NAME`] diagnostic
#[must_use]
pub fn invalid_targeted_tag_name(name: &str, invalid: char) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_TAG_NAME,
        None,
        format!("Tag helpers cannot target tag name '{name}' because it contains a '{invalid}' character."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME_EMPTY`] diagnostic
#[must_use]
pub fn invalid_targeted_parent_tag_name_empty() -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME_EMPTY,
        None,
        "Targeted parent tag name cannot be null or whitespace.",
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME`] diagnostic
#[must_use]
pub fn invalid_targeted_parent_tag_name(name: &str, invalid: char) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_PARENT_TAG_NAME,
        None,
        format!("Tag helpers cannot target parent tag name '{name}' because it contains a '{invalid}' character."),
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME_EMPTY`] diagnostic
#[must_use]
pub fn invalid_targeted_attribute_name_empty() -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME_EMPTY,
        None,
        "Targeted attribute name cannot be null or whitespace.",
    )
}

/// Create a [`DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME`] diagnostic
#[must_use]
pub fn invalid_targeted_attribute_name(name: &str, invalid: char) -> Diagnostic {
    Diagnostic::new(
        DESCRIPTOR_INVALID_TARGETED_ATTRIBUTE_NAME,
        None,
        format!("Tag helpers cannot target attribute name '{name}' because it contains a '{invalid}' character."),
    )
}
