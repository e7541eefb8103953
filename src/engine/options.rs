//! Parser and code generation options.
//!
//! Both options types are assembled the same way: a builder is seeded from the
//! [`EngineConfig`], handed to the caller's callbacks, then to every registered options
//! feature in registration order, and finally frozen into an immutable [`Arc`] snapshot
//! that the whole compilation shares.

use std::sync::Arc;

use strum::Display;

use crate::{descriptors::names_equal, engine::EngineConfig, utils::ChecksumAlgorithm};

/// Where and how often a directive may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Default)]
pub enum DirectiveUsage {
    /// Any number of times, anywhere
    #[default]
    Unrestricted,
    /// At most once per file; a file's own occurrence overrides imported ones
    FileScopedSinglyOccurring,
    /// Any number of times per file
    FileScopedMultipleOccurring,
}

/// Syntactic shape of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Default)]
pub enum DirectiveKind {
    /// The directive and its tokens occupy the rest of one line
    #[default]
    SingleLine,
}

/// One token a directive expects after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DirectiveTokenKind {
    /// The rest of the line, surrounding quotes removed
    String,
    /// A single whitespace-delimited word
    Member,
}

/// Declares a directive the parser recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveDescriptor {
    /// Directive name without `@`
    pub name: String,
    /// Syntactic shape
    pub kind: DirectiveKind,
    /// Occurrence constraint
    pub usage: DirectiveUsage,
    /// Expected tokens, in order
    pub tokens: Vec<DirectiveTokenKind>,
}

impl DirectiveDescriptor {
    /// Create a single-line directive
    #[must_use]
    pub fn single_line(
        name: impl Into<String>,
        usage: DirectiveUsage,
        tokens: Vec<DirectiveTokenKind>,
    ) -> Self {
        DirectiveDescriptor {
            name: name.into(),
            kind: DirectiveKind::SingleLine,
            usage,
            tokens,
        }
    }
}

/// Immutable parser configuration of one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserOptions {
    directives: Vec<DirectiveDescriptor>,
    design_time: bool,
    case_sensitive_tags: bool,
}

impl ParserOptions {
    /// Registered directives
    #[must_use]
    pub fn directives(&self) -> &[DirectiveDescriptor] {
        &self.directives
    }

    /// Look up a registered directive by exact name
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&DirectiveDescriptor> {
        self.directives.iter().find(|directive| directive.name == name)
    }

    /// Whether the compilation is a design-time compilation
    #[must_use]
    pub fn design_time(&self) -> bool {
        self.design_time
    }

    /// Whether element names are compared case-sensitively
    #[must_use]
    pub fn case_sensitive_tags(&self) -> bool {
        self.case_sensitive_tags
    }

    /// Compare two tag names under this configuration
    #[must_use]
    pub fn tag_names_equal(&self, left: &str, right: &str) -> bool {
        names_equal(left, right, self.case_sensitive_tags)
    }
}

/// Mutable builder for [`ParserOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParserOptionsBuilder {
    options: ParserOptions,
}

impl ParserOptionsBuilder {
    /// Create a builder seeded from `config`
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        ParserOptionsBuilder {
            options: ParserOptions {
                directives: Vec::new(),
                design_time: config.design_time,
                case_sensitive_tags: config.case_sensitive_tags,
            },
        }
    }

    /// Register a directive, replacing any registered directive of the same name
    pub fn add_directive(&mut self, directive: DirectiveDescriptor) -> &mut Self {
        match self
            .options
            .directives
            .iter_mut()
            .find(|existing| existing.name == directive.name)
        {
            Some(existing) => *existing = directive,
            None => self.options.directives.push(directive),
        }
        self
    }

    /// Set the design-time flag
    pub fn set_design_time(&mut self, design_time: bool) -> &mut Self {
        self.options.design_time = design_time;
        self
    }

    /// Set tag name case sensitivity
    pub fn set_case_sensitive_tags(&mut self, case_sensitive: bool) -> &mut Self {
        self.options.case_sensitive_tags = case_sensitive;
        self
    }

    /// Directives registered so far
    #[must_use]
    pub fn directives(&self) -> &[DirectiveDescriptor] {
        &self.options.directives
    }

    /// Freeze into a shared snapshot
    #[must_use]
    pub fn build(self) -> Arc<ParserOptions> {
        Arc::new(self.options)
    }
}

/// Immutable code generation configuration of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerationOptions {
    design_time: bool,
    indent_size: usize,
    indent_with_tabs: bool,
    suppress_checksum: bool,
    checksum_algorithm: ChecksumAlgorithm,
}

impl CodeGenerationOptions {
    /// Whether the compilation is a design-time compilation
    #[must_use]
    pub fn design_time(&self) -> bool {
        self.design_time
    }

    /// Spaces per indentation level
    #[must_use]
    pub fn indent_size(&self) -> usize {
        self.indent_size
    }

    /// Whether indentation uses tabs
    #[must_use]
    pub fn indent_with_tabs(&self) -> bool {
        self.indent_with_tabs
    }

    /// Whether the checksum pragma is omitted
    #[must_use]
    pub fn suppress_checksum(&self) -> bool {
        self.suppress_checksum
    }

    /// Digest for the checksum pragma
    #[must_use]
    pub fn checksum_algorithm(&self) -> ChecksumAlgorithm {
        self.checksum_algorithm
    }

    /// Indentation text for nesting `depth`
    #[must_use]
    pub fn indent(&self, depth: usize) -> String {
        if self.indent_with_tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(depth * self.indent_size)
        }
    }
}

impl Default for CodeGenerationOptions {
    fn default() -> Self {
        CodeGenerationOptionsBuilder::new(&EngineConfig::default()).options
    }
}

/// Mutable builder for [`CodeGenerationOptions`].
#[derive(Debug, Clone)]
pub struct CodeGenerationOptionsBuilder {
    options: CodeGenerationOptions,
}

impl CodeGenerationOptionsBuilder {
    /// Create a builder seeded from `config`
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        CodeGenerationOptionsBuilder {
            options: CodeGenerationOptions {
                design_time: config.design_time,
                indent_size: config.indent_size,
                indent_with_tabs: config.indent_with_tabs,
                suppress_checksum: !config.generate_checksum,
                checksum_algorithm: config.checksum_algorithm,
            },
        }
    }

    /// Set the design-time flag
    pub fn set_design_time(&mut self, design_time: bool) -> &mut Self {
        self.options.design_time = design_time;
        self
    }

    /// Set spaces per indentation level
    pub fn set_indent_size(&mut self, indent_size: usize) -> &mut Self {
        self.options.indent_size = indent_size;
        self
    }

    /// Indent with tabs instead of spaces
    pub fn set_indent_with_tabs(&mut self, tabs: bool) -> &mut Self {
        self.options.indent_with_tabs = tabs;
        self
    }

    /// Omit the checksum pragma
    pub fn set_suppress_checksum(&mut self, suppress: bool) -> &mut Self {
        self.options.suppress_checksum = suppress;
        self
    }

    /// Set the checksum digest
    pub fn set_checksum_algorithm(&mut self, algorithm: ChecksumAlgorithm) -> &mut Self {
        self.options.checksum_algorithm = algorithm;
        self
    }

    /// Freeze into a shared snapshot
    #[must_use]
    pub fn build(self) -> Arc<CodeGenerationOptions> {
        Arc::new(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_builder_seeded_from_config() {
        let config = EngineConfig {
            case_sensitive_tags: true,
            ..EngineConfig::design_time()
        };
        let options = ParserOptionsBuilder::new(&config).build();
        assert!(options.design_time());
        assert!(options.case_sensitive_tags());
        assert!(!options.tag_names_equal("div", "DIV"));
    }

    #[test]
    fn test_add_directive_replaces_same_name() {
        let mut builder = ParserOptionsBuilder::new(&EngineConfig::default());
        builder
            .add_directive(DirectiveDescriptor::single_line(
                "page",
                DirectiveUsage::Unrestricted,
                vec![],
            ))
            .add_directive(DirectiveDescriptor::single_line(
                "page",
                DirectiveUsage::FileScopedSinglyOccurring,
                vec![DirectiveTokenKind::String],
            ));

        let options = builder.build();
        assert_eq!(options.directives().len(), 1);
        assert_eq!(
            options.directive("page").map(|d| d.usage),
            Some(DirectiveUsage::FileScopedSinglyOccurring)
        );
        assert!(options.directive("Page").is_none());
    }

    #[test]
    fn test_code_generation_defaults() {
        let options = CodeGenerationOptions::default();
        assert!(!options.suppress_checksum());
        assert_eq!(options.checksum_algorithm(), ChecksumAlgorithm::Sha1);
        assert_eq!(options.indent(2), "        ");
    }

    #[test]
    fn test_code_generation_overrides() {
        let mut builder = CodeGenerationOptionsBuilder::new(&EngineConfig::design_time());
        builder.set_indent_with_tabs(true).set_checksum_algorithm(ChecksumAlgorithm::Md5);
        let options = builder.build();

        assert!(options.design_time());
        assert!(options.suppress_checksum());
        assert_eq!(options.indent(2), "\t\t");
        assert_eq!(options.checksum_algorithm(), ChecksumAlgorithm::Md5);
    }
}
