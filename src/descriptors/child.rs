//! Allowed children: restrictions on which elements may appear inside a tag helper.

use crate::{
    descriptors::{find_invalid_character, DescriptorHash},
    diagnostics::{factory, Diagnostic, HasDiagnostics},
};

/// One tag name a descriptor allows as a direct child.
///
/// A descriptor without allowed children accepts any content. As soon as one is declared,
/// only the listed elements (and no plain text) may appear directly inside it.
#[derive(Debug, Clone)]
pub struct AllowedChildDescriptor {
    name: String,
    display_name: String,
    diagnostics: Vec<Diagnostic>,
}

impl AllowedChildDescriptor {
    /// The allowed tag name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name shown in tooling and diagnostics
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Structural hash, excluding diagnostics
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        DescriptorHash::new()
            .add_str(&self.name)
            .add_str(&self.display_name)
            .finalize()
    }
}

impl PartialEq for AllowedChildDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.display_name == other.display_name
    }
}

impl Eq for AllowedChildDescriptor {}

impl HasDiagnostics for AllowedChildDescriptor {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Builder for [`AllowedChildDescriptor`]
#[derive(Debug, Clone)]
pub struct AllowedChildBuilder {
    parent_display_name: String,
    name: String,
    display_name: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl AllowedChildBuilder {
    /// Create a new builder for a child of `parent_display_name`
    #[must_use]
    pub fn new(parent_display_name: impl Into<String>) -> Self {
        AllowedChildBuilder {
            parent_display_name: parent_display_name.into(),
            name: String::new(),
            display_name: None,
            diagnostics: Vec::new(),
        }
    }

    /// Set the allowed tag name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the display name; defaults to the tag name
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
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
    pub fn build(mut self) -> AllowedChildDescriptor {
        if self.name.trim().is_empty() {
            self.diagnostics
                .push(factory::invalid_restricted_child_empty(&self.parent_display_name));
        } else if let Some(invalid) = find_invalid_character(&self.name) {
            self.diagnostics.push(factory::invalid_restricted_child(
                &self.parent_display_name,
                &self.name,
                invalid,
            ));
        }

        let display_name = self.display_name.unwrap_or_else(|| self.name.clone());
        AllowedChildDescriptor {
            name: self.name,
            display_name,
            diagnostics: self.diagnostics,
        }
    }
}
