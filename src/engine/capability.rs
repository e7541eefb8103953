//! Capability and phase identifiers.

use bitflags::bitflags;
use strum::{Display, EnumIter};

/// The bucket a feature is registered under.
///
/// Every [`crate::engine::Feature`] implements exactly one capability. The registry sorts
/// features into one typed list per capability when the engine is built, so phases look up
/// their passes by slice instead of inspecting features at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Capability {
    /// Contributes to the [`crate::engine::ParserOptions`] snapshot
    ParserOptions,
    /// Contributes to the [`crate::engine::CodeGenerationOptions`] snapshot
    CodeGenerationOptions,
    /// Claims documents during document classification
    DocumentClassifier,
    /// Runs during directive classification
    DirectiveClassifier,
    /// Runs during optimization
    Optimization,
    /// Turns source text into a syntax tree
    SyntaxParser,
    /// Turns the intermediate tree into generated output
    TargetWriter,
}

impl Capability {
    /// The flag of this capability in a [`Capabilities`] set
    #[must_use]
    pub fn flag(self) -> Capabilities {
        match self {
            Capability::ParserOptions => Capabilities::PARSER_OPTIONS,
            Capability::CodeGenerationOptions => Capabilities::CODE_GENERATION_OPTIONS,
            Capability::DocumentClassifier => Capabilities::DOCUMENT_CLASSIFIER,
            Capability::DirectiveClassifier => Capabilities::DIRECTIVE_CLASSIFIER,
            Capability::Optimization => Capabilities::OPTIMIZATION,
            Capability::SyntaxParser => Capabilities::SYNTAX_PARSER,
            Capability::TargetWriter => Capabilities::TARGET_WRITER,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Set of capabilities provided by the registered features
    pub struct Capabilities : u8 {
        /// At least one parser options feature
        const PARSER_OPTIONS = 0x01;
        /// At least one code generation options feature
        const CODE_GENERATION_OPTIONS = 0x02;
        /// At least one document classifier
        const DOCUMENT_CLASSIFIER = 0x04;
        /// At least one directive classifier
        const DIRECTIVE_CLASSIFIER = 0x08;
        /// At least one optimization pass
        const OPTIMIZATION = 0x10;
        /// A syntax parser
        const SYNTAX_PARSER = 0x20;
        /// A target writer
        const TARGET_WRITER = 0x40;
    }
}

/// The standard phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum PhaseKind {
    /// Source text to syntax trees
    Parsing,
    /// Syntax trees to the intermediate tree
    IrLowering,
    /// Assigns the document kind
    DocumentClassification,
    /// Interprets directives and binds tag helpers
    DirectiveClassification,
    /// Lossy rewrites for code generation
    Optimization,
    /// Intermediate tree to generated output
    TargetLowering,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_capability_flags_are_distinct() {
        let all = Capability::iter().fold(Capabilities::empty(), |set, c| {
            assert!(!set.contains(c.flag()));
            set | c.flag()
        });
        assert_eq!(all, Capabilities::all());
    }

    #[test]
    fn test_phase_order() {
        let phases: Vec<PhaseKind> = PhaseKind::iter().collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
        assert_eq!(PhaseKind::IrLowering.to_string(), "IrLowering");
    }
}
