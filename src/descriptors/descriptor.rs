//! The tag descriptor and its builder.

use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    descriptors::{
        rule::names_equal, AllowedChildBuilder, AllowedChildDescriptor, BoundAttributeBuilder,
        BoundAttributeDescriptor, DescriptorCache, DescriptorHash, MatchingRule,
        MatchingRuleBuilder,
    },
    diagnostics::{Diagnostic, HasDiagnostics},
};

/// An immutable description of a custom tag and the elements it applies to.
///
/// A descriptor is identified by `(kind, name, assembly_name)` but compared structurally:
/// two descriptors are equal when every field except their diagnostics is equal. The
/// structural hash is computed once by [`TagDescriptorBuilder::build`] and reused by
/// [`Hash`], [`PartialEq`] and the [`DescriptorCache`].
///
/// # Example
///
/// ```rust
/// use tagscope::descriptors::TagDescriptorBuilder;
///
/// let descriptor = TagDescriptorBuilder::new("TagHelper", "InputTagHelper", "TestAssembly")
///     .tag_matching_rule(|rule| {
///         rule.tag_name("input")
///             .require_attribute(|attribute| attribute.name("type").value("text"))
///     })
///     .bound_attribute(|attribute| attribute.name("value").type_name("System.String"))
///     .build();
///
/// assert_eq!(descriptor.display_name(), "InputTagHelper");
/// assert_eq!(descriptor.tag_matching_rules().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TagDescriptor {
    kind: String,
    name: String,
    assembly_name: String,
    tag_matching_rules: Vec<MatchingRule>,
    bound_attributes: Vec<BoundAttributeDescriptor>,
    allowed_child_tags: Vec<AllowedChildDescriptor>,
    metadata: BTreeMap<String, String>,
    display_name: String,
    documentation: Option<String>,
    tag_output_hint: Option<String>,
    case_sensitive: bool,
    diagnostics: Vec<Diagnostic>,
    hash: u64,
}

impl TagDescriptor {
    /// The descriptor kind, e.g. `TagHelper`
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The descriptor name, usually the implementing type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The assembly the descriptor was discovered in
    #[must_use]
    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    /// Alternative rules under which the descriptor applies
    #[must_use]
    pub fn tag_matching_rules(&self) -> &[MatchingRule] {
        &self.tag_matching_rules
    }

    /// Attributes bound to typed values
    #[must_use]
    pub fn bound_attributes(&self) -> &[BoundAttributeDescriptor] {
        &self.bound_attributes
    }

    /// Restricted children; empty means any content is allowed
    #[must_use]
    pub fn allowed_child_tags(&self) -> &[AllowedChildDescriptor] {
        &self.allowed_child_tags
    }

    /// Free-form metadata
    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Name shown in tooling and diagnostics
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Documentation text
    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Tag name the descriptor renders instead of the source tag, if any
    #[must_use]
    pub fn tag_output_hint(&self) -> Option<&str> {
        self.tag_output_hint.as_deref()
    }

    /// Whether the descriptor's names are compared case-sensitively
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The precomputed structural hash
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        self.hash
    }

    /// `true` if the descriptor declares allowed children
    #[must_use]
    pub fn restricts_children(&self) -> bool {
        !self.allowed_child_tags.is_empty()
    }

    /// `true` if `tag_name` may appear directly inside elements bound to this descriptor
    #[must_use]
    pub fn allows_child(&self, tag_name: &str, document_case_sensitive: bool) -> bool {
        let case_sensitive = self.case_sensitive || document_case_sensitive;
        !self.restricts_children()
            || self
                .allowed_child_tags
                .iter()
                .any(|child| names_equal(child.name(), tag_name, case_sensitive))
    }

    /// Find the bound attribute addressed by an element attribute name.
    ///
    /// Plain names take precedence over dictionary prefixes.
    #[must_use]
    pub fn bound_attribute_for(&self, attribute_name: &str) -> Option<&BoundAttributeDescriptor> {
        self.bound_attributes
            .iter()
            .find(|attribute| attribute.matches_name(attribute_name))
            .or_else(|| {
                self.bound_attributes
                    .iter()
                    .find(|attribute| attribute.matches_indexer(attribute_name))
            })
    }

    /// Every diagnostic of the descriptor and its nested parts
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.tag_matching_rules.iter().flat_map(MatchingRule::all_diagnostics))
            .chain(
                self.bound_attributes
                    .iter()
                    .flat_map(|attribute| attribute.diagnostics().iter()),
            )
            .chain(
                self.allowed_child_tags
                    .iter()
                    .flat_map(|child| child.diagnostics().iter()),
            )
    }

    fn compute_hash(&self) -> u64 {
        let mut hash = DescriptorHash::new()
            .add_str(&self.kind)
            .add_str(&self.name)
            .add_str(&self.assembly_name)
            .add_sequence(
                self.tag_matching_rules
                    .iter()
                    .map(MatchingRule::structural_hash),
            )
            .add_sequence(
                self.bound_attributes
                    .iter()
                    .map(BoundAttributeDescriptor::structural_hash),
            )
            .add_sequence(
                self.allowed_child_tags
                    .iter()
                    .map(AllowedChildDescriptor::structural_hash),
            )
            .add_str(&self.display_name)
            .add_opt_str(self.documentation.as_deref())
            .add_opt_str(self.tag_output_hint.as_deref())
            .add_bool(self.case_sensitive)
            .add_usize(self.metadata.len());

        for (key, value) in &self.metadata {
            hash = hash.add_str(key).add_str(value);
        }

        hash.finalize()
    }
}

impl PartialEq for TagDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.kind == other.kind
            && self.name == other.name
            && self.assembly_name == other.assembly_name
            && self.tag_matching_rules == other.tag_matching_rules
            && self.bound_attributes == other.bound_attributes
            && self.allowed_child_tags == other.allowed_child_tags
            && self.metadata == other.metadata
            && self.display_name == other.display_name
            && self.documentation == other.documentation
            && self.tag_output_hint == other.tag_output_hint
            && self.case_sensitive == other.case_sensitive
    }
}

impl Eq for TagDescriptor {}

impl Hash for TagDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl HasDiagnostics for TagDescriptor {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn has_errors(&self) -> bool {
        self.all_diagnostics().any(Diagnostic::is_error)
    }
}

/// Builder for [`TagDescriptor`].
///
/// Nested parts are configured through closures receiving a fresh nested builder, which
/// inherits this builder's case sensitivity at the time the closure runs.
#[derive(Debug, Clone)]
pub struct TagDescriptorBuilder {
    kind: String,
    name: String,
    assembly_name: String,
    tag_matching_rules: Vec<MatchingRule>,
    bound_attributes: Vec<BoundAttributeDescriptor>,
    allowed_child_tags: Vec<AllowedChildDescriptor>,
    metadata: BTreeMap<String, String>,
    display_name: Option<String>,
    documentation: Option<String>,
    tag_output_hint: Option<String>,
    case_sensitive: bool,
    diagnostics: Vec<Diagnostic>,
}

impl TagDescriptorBuilder {
    /// Create a new builder
    ///
    /// ## Arguments
    /// * `kind` - Descriptor kind, usually [`crate::descriptors::TAG_HELPER_KIND`]
    /// * `name` - Descriptor name
    /// * `assembly_name` - Assembly the descriptor belongs to
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        assembly_name: impl Into<String>,
    ) -> Self {
        TagDescriptorBuilder {
            kind: kind.into(),
            name: name.into(),
            assembly_name: assembly_name.into(),
            tag_matching_rules: Vec::new(),
            bound_attributes: Vec::new(),
            allowed_child_tags: Vec::new(),
            metadata: BTreeMap::new(),
            display_name: None,
            documentation: None,
            tag_output_hint: None,
            case_sensitive: false,
            diagnostics: Vec::new(),
        }
    }

    /// Set the display name; defaults to the descriptor name
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the documentation
    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Set the output tag name hint
    #[must_use]
    pub fn tag_output_hint(mut self, hint: impl Into<String>) -> Self {
        self.tag_output_hint = Some(hint.into());
        self
    }

    /// Set case sensitivity for this descriptor and for nested parts added afterwards
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a matching rule configured by `configure`
    #[must_use]
    pub fn tag_matching_rule<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(MatchingRuleBuilder) -> MatchingRuleBuilder,
    {
        let rule = configure(MatchingRuleBuilder::new(self.case_sensitive)).build();
        self.tag_matching_rules.push(rule);
        self
    }

    /// Add a bound attribute configured by `configure`
    #[must_use]
    pub fn bound_attribute<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(BoundAttributeBuilder) -> BoundAttributeBuilder,
    {
        let parent = self.current_display_name();
        let builder = BoundAttributeBuilder::new(self.kind.clone(), parent, self.case_sensitive);
        self.bound_attributes.push(configure(builder).build());
        self
    }

    /// Add an allowed child configured by `configure`
    #[must_use]
    pub fn allowed_child_tag<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(AllowedChildBuilder) -> AllowedChildBuilder,
    {
        let parent = self.current_display_name();
        let child = configure(AllowedChildBuilder::new(parent)).build();
        self.allowed_child_tags.push(child);
        self
    }

    /// Attach a diagnostic
    #[must_use]
    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Freeze the descriptor and compute its structural hash
    #[must_use]
    pub fn build(self) -> TagDescriptor {
        let display_name = self.current_display_name();
        let mut descriptor = TagDescriptor {
            kind: self.kind,
            name: self.name,
            assembly_name: self.assembly_name,
            tag_matching_rules: self.tag_matching_rules,
            bound_attributes: self.bound_attributes,
            allowed_child_tags: self.allowed_child_tags,
            metadata: self.metadata,
            display_name,
            documentation: self.documentation,
            tag_output_hint: self.tag_output_hint,
            case_sensitive: self.case_sensitive,
            diagnostics: self.diagnostics,
            hash: 0,
        };
        descriptor.hash = descriptor.compute_hash();
        descriptor
    }

    /// Freeze the descriptor and deduplicate it through `cache`.
    ///
    /// Returns the cached instance when a structurally equal descriptor was built before.
    #[must_use]
    pub fn build_cached(self, cache: &DescriptorCache) -> Arc<TagDescriptor> {
        cache.get_or_insert(self.build())
    }

    fn current_display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }
}
