//! Matching rules: the conditions under which a tag descriptor applies to an element.
//!
//! A [`TagDescriptor`](crate::descriptors::TagDescriptor) owns one or more
//! [`MatchingRule`]s. The rules are alternatives: the descriptor applies when any one of them
//! matches. Inside a rule, every [`RequiredAttribute`] must be satisfied.

use strum::Display;

use crate::{
    descriptors::{find_invalid_character, DescriptorHash, ELEMENT_CATCH_ALL_TARGET},
    diagnostics::{factory, Diagnostic, HasDiagnostics},
};

/// How an element must be written for a rule's descriptor to be used correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum TagStructure {
    /// No constraint
    #[default]
    Unspecified,
    /// `<tag></tag>` or `<tag />`
    NormalOrSelfClosing,
    /// `<tag>` or `<tag />`, never with an end tag
    WithoutEndTag,
}

/// How a required attribute's name is compared with an element attribute's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum NameComparisonMode {
    /// Names must be equal
    #[default]
    FullMatch,
    /// The element attribute name must start with the required name
    PrefixMatch,
}

/// How a required attribute's value is compared with an element attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ValueComparisonMode {
    /// The value is not inspected
    #[default]
    None,
    /// Values must be equal
    FullMatch,
    /// The element value must start with the required value
    PrefixMatch,
    /// The element value must end with the required value
    SuffixMatch,
}

/// An attribute constraint inside a [`MatchingRule`].
#[derive(Debug, Clone)]
pub struct RequiredAttribute {
    name: String,
    name_comparison: NameComparisonMode,
    case_sensitive: bool,
    value: Option<String>,
    value_comparison: ValueComparisonMode,
    diagnostics: Vec<Diagnostic>,
}

impl RequiredAttribute {
    /// The required attribute name (or name prefix)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How [`Self::name`] is compared
    #[must_use]
    pub fn name_comparison(&self) -> NameComparisonMode {
        self.name_comparison
    }

    /// Whether names are compared case-sensitively
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The required value, if any
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// How [`Self::value`] is compared
    #[must_use]
    pub fn value_comparison(&self) -> ValueComparisonMode {
        self.value_comparison
    }

    /// Check whether an element attribute name satisfies the name constraint
    #[must_use]
    pub fn is_name_match(&self, attribute_name: &str) -> bool {
        match self.name_comparison {
            NameComparisonMode::FullMatch => {
                names_equal(&self.name, attribute_name, self.case_sensitive)
            }
            NameComparisonMode::PrefixMatch => {
                starts_with(attribute_name, &self.name, self.case_sensitive)
            }
        }
    }

    /// Check whether an element attribute value satisfies the value constraint.
    ///
    /// Values are compared ordinally. A minimized attribute (`None`) only satisfies a
    /// constraint which does not inspect the value.
    #[must_use]
    pub fn is_value_match(&self, attribute_value: Option<&str>) -> bool {
        let Some(required) = self.value.as_deref() else {
            return true;
        };

        match (self.value_comparison, attribute_value) {
            (ValueComparisonMode::None, _) => true,
            (_, None) => false,
            (ValueComparisonMode::FullMatch, Some(value)) => value == required,
            (ValueComparisonMode::PrefixMatch, Some(value)) => value.starts_with(required),
            (ValueComparisonMode::SuffixMatch, Some(value)) => value.ends_with(required),
        }
    }

    /// Check whether `attributes` contains an attribute satisfying this constraint
    #[must_use]
    pub fn is_satisfied_by<'a, I>(&self, attributes: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        attributes
            .into_iter()
            .any(|(name, value)| self.is_name_match(name) && self.is_value_match(value))
    }

    /// Human readable form used in diagnostics, e.g. `'type'="text"`
    #[must_use]
    pub fn display_constraint(&self) -> String {
        let name = match self.name_comparison {
            NameComparisonMode::FullMatch => format!("'{}'", self.name),
            NameComparisonMode::PrefixMatch => format!("'{}…'", self.name),
        };

        match (self.value.as_deref(), self.value_comparison) {
            (Some(value), ValueComparisonMode::FullMatch) => format!("{name}=\"{value}\""),
            (Some(value), ValueComparisonMode::PrefixMatch) => format!("{name}^=\"{value}\""),
            (Some(value), ValueComparisonMode::SuffixMatch) => format!("{name}$=\"{value}\""),
            _ => name,
        }
    }

    /// Structural hash, excluding diagnostics
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        DescriptorHash::new()
            .add_str(&self.name)
            .add_u64(self.name_comparison as u64)
            .add_bool(self.case_sensitive)
            .add_opt_str(self.value.as_deref())
            .add_u64(self.value_comparison as u64)
            .finalize()
    }
}

impl PartialEq for RequiredAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.name_comparison == other.name_comparison
            && self.case_sensitive == other.case_sensitive
            && self.value == other.value
            && self.value_comparison == other.value_comparison
    }
}

impl Eq for RequiredAttribute {}

impl HasDiagnostics for RequiredAttribute {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Builder for [`RequiredAttribute`]
#[derive(Debug, Clone, Default)]
pub struct RequiredAttributeBuilder {
    name: String,
    name_comparison: NameComparisonMode,
    case_sensitive: bool,
    value: Option<String>,
    value_comparison: ValueComparisonMode,
    diagnostics: Vec<Diagnostic>,
}

impl RequiredAttributeBuilder {
    /// Create a new builder; `case_sensitive` is inherited from the owning descriptor
    #[must_use]
    pub fn new(case_sensitive: bool) -> Self {
        RequiredAttributeBuilder {
            case_sensitive,
            ..Default::default()
        }
    }

    /// Set the attribute name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the name comparison mode
    #[must_use]
    pub fn name_comparison(mut self, mode: NameComparisonMode) -> Self {
        self.name_comparison = mode;
        self
    }

    /// Override the case sensitivity
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Require a value; defaults the comparison to [`ValueComparisonMode::FullMatch`]
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        if self.value_comparison == ValueComparisonMode::None {
            self.value_comparison = ValueComparisonMode::FullMatch;
        }
        self
    }

    /// Set the value comparison mode
    #[must_use]
    pub fn value_comparison(mut self, mode: ValueComparisonMode) -> Self {
        self.value_comparison = mode;
        self
    }

    /// Attach a diagnostic
    #[must_use]
    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Validate and freeze
    #[must_use]
    pub fn build(mut self) -> RequiredAttribute {
        if self.name.trim().is_empty() {
            self.diagnostics
                .push(factory::invalid_targeted_attribute_name_empty());
        } else if let Some(invalid) = find_invalid_character(&self.name) {
            self.diagnostics
                .push(factory::invalid_targeted_attribute_name(&self.name, invalid));
        }

        RequiredAttribute {
            name: self.name,
            name_comparison: self.name_comparison,
            case_sensitive: self.case_sensitive,
            value: self.value,
            value_comparison: self.value_comparison,
            diagnostics: self.diagnostics,
        }
    }
}

/// A single condition under which a descriptor applies to an element.
#[derive(Debug, Clone)]
pub struct MatchingRule {
    tag_name: String,
    parent_tag: Option<String>,
    case_sensitive: bool,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttribute>,
    diagnostics: Vec<Diagnostic>,
}

impl MatchingRule {
    /// The targeted tag name; `*` targets every element
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// The required parent tag, if any
    #[must_use]
    pub fn parent_tag(&self) -> Option<&str> {
        self.parent_tag.as_deref()
    }

    /// Whether tag names are compared case-sensitively
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The expected element structure
    #[must_use]
    pub fn tag_structure(&self) -> TagStructure {
        self.tag_structure
    }

    /// The required attributes, all of which must be satisfied
    #[must_use]
    pub fn attributes(&self) -> &[RequiredAttribute] {
        &self.attributes
    }

    /// `true` if this rule targets every element
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.tag_name == ELEMENT_CATCH_ALL_TARGET
    }

    /// Check the tag name constraint
    ///
    /// ## Arguments
    /// * `tag_name` - The element name, prefix already stripped
    /// * `document_case_sensitive` - Forces case-sensitive comparison when set
    #[must_use]
    pub fn is_tag_match(&self, tag_name: &str, document_case_sensitive: bool) -> bool {
        self.is_catch_all()
            || names_equal(
                &self.tag_name,
                tag_name,
                self.case_sensitive || document_case_sensitive,
            )
    }

    /// Check the parent constraint
    #[must_use]
    pub fn is_parent_match(&self, parent_tag: Option<&str>, document_case_sensitive: bool) -> bool {
        match (self.parent_tag.as_deref(), parent_tag) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(required), Some(parent)) => names_equal(
                required,
                parent,
                self.case_sensitive || document_case_sensitive,
            ),
        }
    }

    /// Return the first required attribute not satisfied by `attributes`
    #[must_use]
    pub fn first_unsatisfied<'r, 'a>(
        &'r self,
        attributes: &[(&'a str, Option<&'a str>)],
    ) -> Option<&'r RequiredAttribute> {
        self.attributes
            .iter()
            .find(|required| !required.is_satisfied_by(attributes.iter().copied()))
    }

    /// Structural hash, excluding diagnostics
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        DescriptorHash::new()
            .add_str(&self.tag_name)
            .add_opt_str(self.parent_tag.as_deref())
            .add_bool(self.case_sensitive)
            .add_u64(self.tag_structure as u64)
            .add_sequence(self.attributes.iter().map(RequiredAttribute::structural_hash))
            .finalize()
    }

    /// Iterate over the diagnostics of this rule and its required attributes
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.attributes.iter().flat_map(|a| a.diagnostics.iter()))
    }
}

impl PartialEq for MatchingRule {
    fn eq(&self, other: &Self) -> bool {
        self.tag_name == other.tag_name
            && self.parent_tag == other.parent_tag
            && self.case_sensitive == other.case_sensitive
            && self.tag_structure == other.tag_structure
            && self.attributes == other.attributes
    }
}

impl Eq for MatchingRule {}

impl HasDiagnostics for MatchingRule {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn has_errors(&self) -> bool {
        self.all_diagnostics().any(Diagnostic::is_error)
    }
}

/// Builder for [`MatchingRule`]
#[derive(Debug, Clone, Default)]
pub struct MatchingRuleBuilder {
    tag_name: String,
    parent_tag: Option<String>,
    case_sensitive: bool,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttribute>,
    diagnostics: Vec<Diagnostic>,
}

impl MatchingRuleBuilder {
    /// Create a new builder; `case_sensitive` is inherited from the owning descriptor
    #[must_use]
    pub fn new(case_sensitive: bool) -> Self {
        MatchingRuleBuilder {
            case_sensitive,
            ..Default::default()
        }
    }

    /// Set the targeted tag name
    #[must_use]
    pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Require a parent tag
    #[must_use]
    pub fn parent_tag(mut self, parent_tag: impl Into<String>) -> Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    /// Override the case sensitivity
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the expected tag structure
    #[must_use]
    pub fn tag_structure(mut self, tag_structure: TagStructure) -> Self {
        self.tag_structure = tag_structure;
        self
    }

    /// Add a required attribute configured by `configure`
    #[must_use]
    pub fn require_attribute<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(RequiredAttributeBuilder) -> RequiredAttributeBuilder,
    {
        let builder = configure(RequiredAttributeBuilder::new(self.case_sensitive));
        self.attributes.push(builder.build());
        self
    }

    /// Attach a diagnostic
    #[must_use]
    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Validate and freeze
    #[must_use]
    pub fn build(mut self) -> MatchingRule {
        if self.tag_name.trim().is_empty() {
            self.diagnostics.push(factory::invalid_targeted_tag_name_empty());
        } else if self.tag_name != ELEMENT_CATCH_ALL_TARGET {
            if let Some(invalid) = find_invalid_character(&self.tag_name) {
                self.diagnostics
                    .push(factory::invalid_targeted_tag_name(&self.tag_name, invalid));
            }
        }

        if let Some(parent) = &self.parent_tag {
            if parent.trim().is_empty() {
                self.diagnostics
                    .push(factory::invalid_targeted_parent_tag_name_empty());
            } else if let Some(invalid) = find_invalid_character(parent) {
                self.diagnostics
                    .push(factory::invalid_targeted_parent_tag_name(parent, invalid));
            }
        }

        MatchingRule {
            tag_name: self.tag_name,
            parent_tag: self.parent_tag,
            case_sensitive: self.case_sensitive,
            tag_structure: self.tag_structure,
            attributes: self.attributes,
            diagnostics: self.diagnostics,
        }
    }
}

/// Compare two names under the given case rule
pub(crate) fn names_equal(left: &str, right: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        left == right
    } else {
        left.eq_ignore_ascii_case(right)
    }
}

/// `value.starts_with(prefix)` under the given case rule
pub(crate) fn starts_with(value: &str, prefix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        value.starts_with(prefix)
    } else {
        value.len() >= prefix.len()
            && value.is_char_boundary(prefix.len())
            && value[..prefix.len()].eq_ignore_ascii_case(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text_rule() -> MatchingRule {
        MatchingRuleBuilder::new(false)
            .tag_name("input")
            .require_attribute(|a| a.name("type").value("text"))
            .build()
    }

    #[test]
    fn test_value_defaults_to_full_match() {
        let rule = type_text_rule();
        assert_eq!(
            rule.attributes()[0].value_comparison(),
            ValueComparisonMode::FullMatch
        );
    }

    #[test]
    fn test_required_attribute_satisfaction() {
        let rule = type_text_rule();
        let required = &rule.attributes()[0];

        assert!(required.is_satisfied_by([("type", Some("text"))]));
        assert!(required.is_satisfied_by([("TYPE", Some("text"))]));
        assert!(!required.is_satisfied_by([("type", Some("password"))]));
        assert!(!required.is_satisfied_by([("type", None)]));
        assert!(!required.is_satisfied_by(std::iter::empty()));
    }

    #[test]
    fn test_value_is_ordinal() {
        let rule = type_text_rule();
        assert!(!rule.attributes()[0].is_satisfied_by([("type", Some("TEXT"))]));
    }

    #[test]
    fn test_prefix_name_match() {
        let required = RequiredAttributeBuilder::new(false)
            .name("asp-route-")
            .name_comparison(NameComparisonMode::PrefixMatch)
            .build();

        assert!(required.is_name_match("asp-route-id"));
        assert!(required.is_name_match("ASP-ROUTE-id"));
        assert!(!required.is_name_match("asp-rout"));
    }

    #[test]
    fn test_case_sensitive_name_match() {
        let required = RequiredAttributeBuilder::new(true).name("Value").build();
        assert!(required.is_name_match("Value"));
        assert!(!required.is_name_match("value"));
    }

    #[test]
    fn test_prefix_and_suffix_values() {
        let prefix = RequiredAttributeBuilder::new(false)
            .name("href")
            .value("~/")
            .value_comparison(ValueComparisonMode::PrefixMatch)
            .build();
        assert!(prefix.is_value_match(Some("~/css/site.css")));
        assert!(!prefix.is_value_match(Some("/css/site.css")));

        let suffix = RequiredAttributeBuilder::new(false)
            .name("src")
            .value(".js")
            .value_comparison(ValueComparisonMode::SuffixMatch)
            .build();
        assert!(suffix.is_value_match(Some("site.js")));
        assert!(!suffix.is_value_match(Some("site.css")));
    }

    #[test]
    fn test_value_comparison_none_ignores_value() {
        let required = RequiredAttributeBuilder::new(false)
            .name("type")
            .value("text")
            .value_comparison(ValueComparisonMode::None)
            .build();
        assert!(required.is_satisfied_by([("type", None)]));
    }

    #[test]
    fn test_catch_all_matches_any_tag() {
        let rule = MatchingRuleBuilder::new(false).tag_name("*").build();
        assert!(rule.is_catch_all());
        assert!(rule.is_tag_match("div", false));
        assert!(rule.is_tag_match("anything", true));
        assert!(!rule.has_errors());
    }

    #[test]
    fn test_parent_constraint() {
        let rule = MatchingRuleBuilder::new(false)
            .tag_name("tr")
            .parent_tag("table")
            .build();

        assert!(rule.is_parent_match(Some("table"), false));
        assert!(rule.is_parent_match(Some("TABLE"), false));
        assert!(!rule.is_parent_match(Some("TABLE"), true));
        assert!(!rule.is_parent_match(Some("div"), false));
        assert!(!rule.is_parent_match(None, false));
    }

    #[test]
    fn test_document_case_sensitivity_forces_exact_tag() {
        let rule = MatchingRuleBuilder::new(false).tag_name("Input").build();
        assert!(rule.is_tag_match("input", false));
        assert!(!rule.is_tag_match("input", true));
    }

    #[test]
    fn test_validation_empty_tag_name() {
        let rule = MatchingRuleBuilder::new(false).tag_name("  ").build();
        assert!(rule.has_errors());
        assert_eq!(rule.diagnostics()[0].id(), "TS3007");
    }

    #[test]
    fn test_validation_invalid_characters() {
        let rule = MatchingRuleBuilder::new(false)
            .tag_name("my!tag")
            .parent_tag("pa<rent")
            .require_attribute(|a| a.name("bad attr"))
            .build();

        let ids: Vec<_> = rule.all_diagnostics().map(Diagnostic::id).collect();
        assert_eq!(ids, vec!["TS3008", "TS3010", "TS3012"]);
        assert!(rule.has_errors());
    }

    #[test]
    fn test_equality_ignores_diagnostics() {
        let clean = type_text_rule();
        let noisy = MatchingRuleBuilder::new(false)
            .tag_name("input")
            .require_attribute(|a| a.name("type").value("text"))
            .diagnostic(factory::invalid_targeted_tag_name_empty())
            .build();

        assert_eq!(clean, noisy);
        assert_eq!(clean.structural_hash(), noisy.structural_hash());
    }

    #[test]
    fn test_hash_distinguishes_structure() {
        let a = type_text_rule();
        let b = MatchingRuleBuilder::new(false)
            .tag_name("input")
            .require_attribute(|a| a.name("type").value("password"))
            .build();
        assert_ne!(a, b);
        assert_ne!(a.structural_hash(), b.structural_hash());
    }

    #[test]
    fn test_display_constraint() {
        let rule = type_text_rule();
        assert_eq!(rule.attributes()[0].display_constraint(), "'type'=\"text\"");
    }

    #[test]
    fn test_starts_with_non_ascii_boundary() {
        assert!(!starts_with("é", "e", false));
        assert!(starts_with("éa", "é", false));
    }
}
