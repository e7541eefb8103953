//! Configuration for the compilation engine.

use crate::utils::ChecksumAlgorithm;

/// Base configuration every options snapshot is seeded from.
///
/// Callbacks registered on the [`crate::EngineBuilder`] and options features may override any
/// of these per compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Produce design-time output (default: false)
    pub design_time: bool,

    /// Compare element names case-sensitively during parsing and binding (default: false)
    pub case_sensitive_tags: bool,

    /// Tag helper prefix used when a document declares none (default: none)
    pub default_tag_helper_prefix: Option<String>,

    /// Embed a checksum pragma of the source in generated output (default: true)
    pub generate_checksum: bool,

    /// Digest used for the checksum pragma (default: SHA-1)
    pub checksum_algorithm: ChecksumAlgorithm,

    /// Spaces per indentation level in generated output (default: 4)
    pub indent_size: usize,

    /// Indent generated output with tabs instead of spaces (default: false)
    pub indent_with_tabs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            design_time: false,
            case_sensitive_tags: false,
            default_tag_helper_prefix: None,
            generate_checksum: true,
            checksum_algorithm: ChecksumAlgorithm::Sha1,
            indent_size: 4,
            indent_with_tabs: false,
        }
    }
}

impl EngineConfig {
    /// Configuration for design-time compilation, as used by editors
    #[must_use]
    pub fn design_time() -> Self {
        Self {
            design_time: true,
            generate_checksum: false,
            ..Self::default()
        }
    }
}
