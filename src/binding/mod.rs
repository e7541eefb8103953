//! Descriptor matching.
//!
//! Binding decides which tag descriptors apply to one element occurrence. A descriptor binds
//! when at least one of its matching rules matches; a rule matches when the tag name, the
//! parent constraint and every required attribute hold.
//!
//! [`bind`] evaluates a plain descriptor list. [`TagHelperBinder`] indexes a document's
//! descriptors by tag name and applies the document's tag helper prefix, and is what the
//! pipeline uses for every element.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use tagscope::binding::{bind, ElementQuery};
//! use tagscope::descriptors::{TagDescriptorBuilder, TAG_HELPER_KIND};
//! use tagscope::diagnostics::HasDiagnostics;
//!
//! let input = Arc::new(
//!     TagDescriptorBuilder::new(TAG_HELPER_KIND, "TextInput", "Forms")
//!         .tag_matching_rule(|rule| {
//!             rule.tag_name("input")
//!                 .require_attribute(|attribute| attribute.name("type").value("text"))
//!         })
//!         .build(),
//! );
//!
//! let text = ElementQuery::new("input").attribute("type", Some("text"));
//! assert!(bind(&[Arc::clone(&input)], &text).is_bound());
//!
//! let password = ElementQuery::new("input").attribute("type", Some("password"));
//! let result = bind(&[input], &password);
//! assert!(!result.is_bound());
//! assert_eq!(result.diagnostics().len(), 1);
//! ```

mod binder;

use std::sync::Arc;

pub use binder::TagHelperBinder;

use crate::{
    descriptors::{MatchingRule, RequiredAttribute, TagDescriptor},
    diagnostics::{factory, Diagnostic, HasDiagnostics},
    document::SourceSpan,
};

/// An element occurrence to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery<'a> {
    /// Element name as written
    pub tag_name: &'a str,
    /// Name of the enclosing element, if any
    pub parent_tag: Option<&'a str>,
    /// Attributes in source order; `None` values are minimized attributes
    pub attributes: Vec<(&'a str, Option<&'a str>)>,
    /// Whether the document compares tag names case-sensitively
    pub case_sensitive: bool,
    /// Location reported on binding diagnostics
    pub span: Option<SourceSpan>,
}

impl<'a> ElementQuery<'a> {
    /// A query for a parentless element without attributes
    #[must_use]
    pub fn new(tag_name: &'a str) -> Self {
        ElementQuery {
            tag_name,
            parent_tag: None,
            attributes: Vec::new(),
            case_sensitive: false,
            span: None,
        }
    }

    /// Set the enclosing element
    #[must_use]
    pub fn parent(mut self, parent_tag: &'a str) -> Self {
        self.parent_tag = Some(parent_tag);
        self
    }

    /// Append an attribute
    #[must_use]
    pub fn attribute(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        self.attributes.push((name, value));
        self
    }

    /// Set document case sensitivity
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the diagnostic location
    #[must_use]
    pub fn span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }
}

/// A descriptor that bound an element, with the rules that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorBinding {
    descriptor: Arc<TagDescriptor>,
    matched_rules: Vec<usize>,
}

impl DescriptorBinding {
    /// The bound descriptor
    #[must_use]
    pub fn descriptor(&self) -> &Arc<TagDescriptor> {
        &self.descriptor
    }

    /// The matching rules that matched, in declaration order
    pub fn matched_rules(&self) -> impl Iterator<Item = &MatchingRule> + '_ {
        self.matched_rules
            .iter()
            .filter_map(|index| self.descriptor.tag_matching_rules().get(*index))
    }
}

/// Outcome of binding one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingResult {
    bindings: Vec<DescriptorBinding>,
    diagnostics: Vec<Diagnostic>,
}

impl BindingResult {
    /// `true` if at least one descriptor bound
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Bindings in input order
    #[must_use]
    pub fn bindings(&self) -> &[DescriptorBinding] {
        &self.bindings
    }

    /// Bound descriptors in input order
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagDescriptor>> + '_ {
        self.bindings.iter().map(DescriptorBinding::descriptor)
    }

    /// Split into bindings and diagnostics
    #[must_use]
    pub fn into_parts(self) -> (Vec<DescriptorBinding>, Vec<Diagnostic>) {
        (self.bindings, self.diagnostics)
    }
}

impl HasDiagnostics for BindingResult {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Evaluate one descriptor against `query`.
///
/// Returns the indices of matching rules, or the first unsatisfied required attribute of the
/// first rule whose tag and parent constraints held.
fn evaluate<'d>(
    descriptor: &'d TagDescriptor,
    query: &ElementQuery<'_>,
) -> (Vec<usize>, Option<&'d RequiredAttribute>) {
    let mut matched = Vec::new();
    let mut unsatisfied = None;

    for (index, rule) in descriptor.tag_matching_rules().iter().enumerate() {
        if !rule.is_tag_match(query.tag_name, query.case_sensitive)
            || !rule.is_parent_match(query.parent_tag, query.case_sensitive)
        {
            continue;
        }

        match rule.first_unsatisfied(&query.attributes) {
            None => matched.push(index),
            Some(required) => {
                unsatisfied.get_or_insert(required);
            }
        }
    }

    (matched, unsatisfied)
}

/// Bind `query` against `descriptors`.
///
/// Bound descriptors keep their input order. Every descriptor that did not bind although one
/// of its rules matched tag and parent contributes one warning naming the first required
/// attribute that failed; such warnings never prevent other descriptors from binding.
#[must_use]
pub fn bind(descriptors: &[Arc<TagDescriptor>], query: &ElementQuery<'_>) -> BindingResult {
    let mut result = BindingResult::default();

    for descriptor in descriptors {
        let (matched_rules, unsatisfied) = evaluate(descriptor, query);
        if !matched_rules.is_empty() {
            log::trace!(
                "'{}' binds <{}> through {} rule(s)",
                descriptor.display_name(),
                query.tag_name,
                matched_rules.len()
            );
            result.bindings.push(DescriptorBinding {
                descriptor: Arc::clone(descriptor),
                matched_rules,
            });
        } else if let Some(required) = unsatisfied {
            log::trace!(
                "'{}' skips <{}>: {} not satisfied",
                descriptor.display_name(),
                query.tag_name,
                required.display_constraint()
            );
            result.diagnostics.push(factory::unmatched_required_attribute(
                query.span,
                descriptor.display_name(),
                query.tag_name,
                &required.display_constraint(),
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptors::{TagDescriptorBuilder, ValueComparisonMode, TAG_HELPER_KIND},
        diagnostics::Severity,
    };

    fn text_input() -> Arc<TagDescriptor> {
        Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "TextInput", "Forms")
                .tag_matching_rule(|rule| {
                    rule.tag_name("input")
                        .require_attribute(|attribute| attribute.name("type").value("text"))
                })
                .build(),
        )
    }

    fn table_row() -> Arc<TagDescriptor> {
        Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "Row", "Tables")
                .tag_matching_rule(|rule| rule.tag_name("tr").parent_tag("table"))
                .build(),
        )
    }

    #[test]
    fn test_required_value_binds() {
        let query = ElementQuery::new("input").attribute("type", Some("text"));
        let result = bind(&[text_input()], &query);

        assert!(result.is_bound());
        assert!(result.diagnostics().is_empty());
        assert_eq!(result.bindings()[0].matched_rules().count(), 1);
    }

    #[test]
    fn test_wrong_value_reports_constraint() {
        let query = ElementQuery::new("input").attribute("type", Some("password"));
        let result = bind(&[text_input()], &query);

        assert!(!result.is_bound());
        assert_eq!(result.diagnostics().len(), 1);
        let diagnostic = &result.diagnostics()[0];
        assert_eq!(diagnostic.id(), "TS2003");
        assert_eq!(diagnostic.severity(), Severity::Warning);
        assert!(diagnostic.message().contains("'type'=\"text\""));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_missing_attribute_does_not_bind() {
        let result = bind(&[text_input()], &ElementQuery::new("input"));
        assert!(!result.is_bound());
    }

    #[test]
    fn test_minimized_attribute_fails_value_constraint() {
        let query = ElementQuery::new("input").attribute("type", None);
        assert!(!bind(&[text_input()], &query).is_bound());
    }

    #[test]
    fn test_parent_constraint() {
        let inside = ElementQuery::new("tr").parent("table");
        let outside = ElementQuery::new("tr").parent("div");
        let top_level = ElementQuery::new("tr");

        assert!(bind(&[table_row()], &inside).is_bound());
        assert!(!bind(&[table_row()], &outside).is_bound());
        assert!(!bind(&[table_row()], &top_level).is_bound());
        // no attribute constraint failed, so nothing to report
        assert!(bind(&[table_row()], &outside).diagnostics().is_empty());
    }

    #[test]
    fn test_case_rules() {
        let query = ElementQuery::new("INPUT").attribute("TYPE", Some("text"));
        assert!(bind(&[text_input()], &query).is_bound());

        let sensitive = query.clone().case_sensitive(true);
        assert!(!bind(&[text_input()], &sensitive).is_bound());

        // values are always ordinal
        let upper_value = ElementQuery::new("input").attribute("type", Some("TEXT"));
        assert!(!bind(&[text_input()], &upper_value).is_bound());
    }

    #[test]
    fn test_rules_are_ored_and_order_is_stable() {
        let either = Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "Either", "Lib")
                .tag_matching_rule(|rule| rule.tag_name("a"))
                .tag_matching_rule(|rule| rule.tag_name("*").require_attribute(|a| a.name("x")))
                .build(),
        );
        let catch_all = Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "All", "Lib")
                .tag_matching_rule(|rule| rule.tag_name("*"))
                .build(),
        );

        let descriptors = [Arc::clone(&catch_all), Arc::clone(&either), text_input()];
        let query = ElementQuery::new("span").attribute("x", None);
        let result = bind(&descriptors, &query);

        let names: Vec<&str> = result.descriptors().map(|d| d.name()).collect();
        assert_eq!(names, vec!["All", "Either"]);

        let anchor = bind(&descriptors, &ElementQuery::new("a").attribute("x", Some("1")));
        assert_eq!(anchor.bindings()[1].matched_rules().count(), 2);
    }

    #[test]
    fn test_suffix_and_prefix_values() {
        let script = Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "Script", "Lib")
                .tag_matching_rule(|rule| {
                    rule.tag_name("script").require_attribute(|attribute| {
                        attribute
                            .name("src")
                            .value(".js")
                            .value_comparison(ValueComparisonMode::SuffixMatch)
                    })
                })
                .build(),
        );

        let js = ElementQuery::new("script").attribute("src", Some("site.js"));
        let css = ElementQuery::new("script").attribute("src", Some("site.css"));
        assert!(bind(&[Arc::clone(&script)], &js).is_bound());
        assert!(!bind(&[script], &css).is_bound());
    }
}
