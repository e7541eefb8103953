//! Bound attributes: element attributes a tag descriptor consumes as typed values.

use std::collections::BTreeMap;

use crate::{
    descriptors::{find_invalid_character, rule::names_equal, rule::starts_with, DescriptorHash},
    diagnostics::{factory, Diagnostic, HasDiagnostics},
};

/// Attribute name prefix reserved for plain HTML data attributes
const DATA_DASH_PREFIX: &str = "data-";

/// Describes one attribute a descriptor binds to.
///
/// An attribute is either a plain attribute (`name`) or a dictionary-like attribute family
/// matched by `indexer_name_prefix` (`asp-route-{key}`), or both.
#[derive(Debug, Clone)]
pub struct BoundAttributeDescriptor {
    kind: String,
    name: Option<String>,
    type_name: String,
    is_enum: bool,
    indexer_name_prefix: Option<String>,
    indexer_type_name: Option<String>,
    documentation: Option<String>,
    display_name: String,
    case_sensitive: bool,
    metadata: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl BoundAttributeDescriptor {
    /// The kind of the owning descriptor
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The attribute name, if the attribute binds to a plain name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared value type
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// `true` if the value type is an enumeration
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.is_enum
    }

    /// `true` if the attribute is dictionary-like
    #[must_use]
    pub fn has_indexer(&self) -> bool {
        self.indexer_name_prefix.is_some()
    }

    /// Prefix for dictionary-like attribute names
    #[must_use]
    pub fn indexer_name_prefix(&self) -> Option<&str> {
        self.indexer_name_prefix.as_deref()
    }

    /// Value type of dictionary entries
    #[must_use]
    pub fn indexer_type_name(&self) -> Option<&str> {
        self.indexer_type_name.as_deref()
    }

    /// Documentation text
    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Name shown in tooling and diagnostics
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether names are compared case-sensitively
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Free-form metadata
    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// `true` if `attribute_name` addresses this attribute by its plain name
    #[must_use]
    pub fn matches_name(&self, attribute_name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| names_equal(name, attribute_name, self.case_sensitive))
    }

    /// `true` if `attribute_name` addresses an entry of this dictionary-like attribute.
    ///
    /// An exact prefix without a key also counts; the binder reports it as missing a key.
    #[must_use]
    pub fn matches_indexer(&self, attribute_name: &str) -> bool {
        self.indexer_name_prefix
            .as_deref()
            .is_some_and(|prefix| starts_with(attribute_name, prefix, self.case_sensitive))
    }

    /// Structural hash, excluding diagnostics
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        let mut hash = DescriptorHash::new()
            .add_str(&self.kind)
            .add_opt_str(self.name.as_deref())
            .add_str(&self.type_name)
            .add_bool(self.is_enum)
            .add_opt_str(self.indexer_name_prefix.as_deref())
            .add_opt_str(self.indexer_type_name.as_deref())
            .add_opt_str(self.documentation.as_deref())
            .add_str(&self.display_name)
            .add_bool(self.case_sensitive)
            .add_usize(self.metadata.len());

        for (key, value) in &self.metadata {
            hash = hash.add_str(key).add_str(value);
        }

        hash.finalize()
    }
}

impl PartialEq for BoundAttributeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.type_name == other.type_name
            && self.is_enum == other.is_enum
            && self.indexer_name_prefix == other.indexer_name_prefix
            && self.indexer_type_name == other.indexer_type_name
            && self.documentation == other.documentation
            && self.display_name == other.display_name
            && self.case_sensitive == other.case_sensitive
            && self.metadata == other.metadata
    }
}

impl Eq for BoundAttributeDescriptor {}

impl HasDiagnostics for BoundAttributeDescriptor {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Builder for [`BoundAttributeDescriptor`]
#[derive(Debug, Clone)]
pub struct BoundAttributeBuilder {
    parent_display_name: String,
    kind: String,
    name: Option<String>,
    type_name: String,
    is_enum: bool,
    indexer_name_prefix: Option<String>,
    indexer_type_name: Option<String>,
    documentation: Option<String>,
    display_name: Option<String>,
    case_sensitive: bool,
    metadata: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl BoundAttributeBuilder {
    /// Create a new builder for an attribute of the descriptor `parent_display_name`
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        parent_display_name: impl Into<String>,
        case_sensitive: bool,
    ) -> Self {
        BoundAttributeBuilder {
            parent_display_name: parent_display_name.into(),
            kind: kind.into(),
            name: None,
            type_name: String::new(),
            is_enum: false,
            indexer_name_prefix: None,
            indexer_type_name: None,
            documentation: None,
            display_name: None,
            case_sensitive,
            metadata: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Set the attribute name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the declared value type
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Mark the value type as an enumeration
    #[must_use]
    pub fn is_enum(mut self, is_enum: bool) -> Self {
        self.is_enum = is_enum;
        self
    }

    /// Make the attribute dictionary-like
    ///
    /// ## Arguments
    /// * `prefix` - Name prefix of the dictionary entries, e.g. `asp-route-`
    /// * `type_name` - Value type of the entries
    #[must_use]
    pub fn indexer(mut self, prefix: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(type_name.into());
        self
    }

    /// Set the documentation
    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Set the display name; defaults to `Parent.name`
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
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
    pub fn build(mut self) -> BoundAttributeDescriptor {
        let display_name = self.display_name.take().unwrap_or_else(|| {
            format!(
                "{}.{}",
                self.parent_display_name,
                self.name.as_deref().unwrap_or_default()
            )
        });

        self.validate(&display_name);

        BoundAttributeDescriptor {
            kind: self.kind,
            name: self.name,
            type_name: self.type_name,
            is_enum: self.is_enum,
            indexer_name_prefix: self.indexer_name_prefix,
            indexer_type_name: self.indexer_type_name,
            documentation: self.documentation,
            display_name,
            case_sensitive: self.case_sensitive,
            metadata: self.metadata,
            diagnostics: self.diagnostics,
        }
    }

    fn validate(&mut self, display_name: &str) {
        match self.name.as_deref() {
            // A pure dictionary attribute may omit the plain name
            None if self.indexer_name_prefix.is_some() => {}
            None => self.diagnostics.push(factory::invalid_bound_attribute_empty(
                &self.parent_display_name,
                display_name,
            )),
            Some(name) if name.trim().is_empty() => {
                self.diagnostics.push(factory::invalid_bound_attribute_empty(
                    &self.parent_display_name,
                    display_name,
                ));
            }
            Some(name) => {
                if starts_with(name, DATA_DASH_PREFIX, false) {
                    self.diagnostics
                        .push(factory::invalid_bound_attribute_name_starts_with(
                            &self.parent_display_name,
                            display_name,
                            name,
                        ));
                }
                if let Some(invalid) = find_invalid_character(name) {
                    self.diagnostics.push(factory::invalid_bound_attribute_name(
                        &self.parent_display_name,
                        display_name,
                        name,
                        invalid,
                    ));
                }
            }
        }

        if let Some(prefix) = self.indexer_name_prefix.as_deref() {
            if starts_with(prefix, DATA_DASH_PREFIX, false) {
                self.diagnostics
                    .push(factory::invalid_bound_attribute_prefix_starts_with(
                        &self.parent_display_name,
                        display_name,
                        prefix,
                    ));
            }
            if let Some(invalid) = find_invalid_character(prefix) {
                self.diagnostics.push(factory::invalid_bound_attribute_prefix(
                    &self.parent_display_name,
                    display_name,
                    prefix,
                    invalid,
                ));
            }
        }
    }
}
