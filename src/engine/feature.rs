//! Feature traits and the capability-bucketed registry.
//!
//! A feature is a pluggable unit of work. Each one implements [`EngineFeature`] plus exactly
//! one capability trait, and is handed to the [`crate::EngineBuilder`] wrapped in the matching
//! [`Feature`] variant. When the engine is built, the registry keeps one typed list per
//! capability so a phase reaches its passes through a slice:
//!
//! | Capability | Trait | Used by |
//! |---|---|---|
//! | [`Capability::ParserOptions`] | [`ConfigureParserOptions`] | options composition |
//! | [`Capability::CodeGenerationOptions`] | [`ConfigureCodeGeneration`] | options composition |
//! | [`Capability::DocumentClassifier`] | [`DocumentClassifierPass`] | document classification |
//! | [`Capability::DirectiveClassifier`] | [`IrPass`] | directive classification |
//! | [`Capability::Optimization`] | [`IrPass`] | optimization |
//! | [`Capability::SyntaxParser`] | [`SyntaxParser`] | parsing |
//! | [`Capability::TargetWriter`] | [`TargetWriter`] | target lowering |

use crate::{
    document::{Document, GeneratedOutput},
    engine::{
        Capabilities, Capability, CodeGenerationOptions, CodeGenerationOptionsBuilder,
        EngineConfig, ParserOptionsBuilder, PhaseKind,
    },
    ir::IrTree,
    syntax::SyntaxParser,
    Error, Result,
};

/// Order of passes that do not override [`IrPass::order`].
pub const DEFAULT_FEATURE_ORDER: i32 = 1000;

/// Common surface of every feature.
///
/// Features must be thread-safe (Send + Sync) because a built engine may compile many
/// documents in parallel. They are never mutated after initialization.
pub trait EngineFeature: Send + Sync {
    /// Unique name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Called exactly once while the engine is built.
    ///
    /// All features are initialized in a flat fan-out in registration order. The index lists
    /// which capabilities are registered, so a feature may fail fast when a sibling it depends
    /// on is absent, but it must not assume the sibling is initialized yet.
    ///
    /// # Errors
    /// Returns an error if the feature cannot work with the registered set of features.
    fn initialize(&mut self, _features: &FeatureIndex) -> Result<()> {
        Ok(())
    }
}

/// Contributes to the parser options of every compilation.
///
/// Configure features run in registration order, never sorted.
pub trait ConfigureParserOptions: EngineFeature {
    /// Adjust the options being composed
    fn configure(&self, builder: &mut ParserOptionsBuilder);
}

/// Contributes to the code generation options of every compilation.
pub trait ConfigureCodeGeneration: EngineFeature {
    /// Adjust the options being composed
    fn configure(&self, builder: &mut CodeGenerationOptionsBuilder);
}

/// Shared state handed to every pass invocation.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// The phase running the pass
    pub phase: PhaseKind,
    /// The engine configuration
    pub config: &'a EngineConfig,
    /// Registered capabilities
    pub features: &'a FeatureIndex,
}

/// Claims a document during document classification.
///
/// Classifiers are consulted in ascending [`DocumentClassifierPass::order`]. The first one
/// whose [`DocumentClassifierPass::is_match`] returns `true` sets the document kind; the phase
/// skips all later classifiers once a kind is set.
pub trait DocumentClassifierPass: EngineFeature {
    /// Position among classifiers, lower runs first
    fn order(&self) -> i32 {
        DEFAULT_FEATURE_ORDER
    }

    /// The document kind this classifier assigns
    fn document_kind(&self) -> &str;

    /// Whether this classifier claims the document
    fn is_match(&self, document: &Document, ir: &IrTree) -> bool;

    /// Called after the kind was assigned, to rewrite the tree for that kind.
    ///
    /// # Errors
    /// Returns an error if the tree cannot be rewritten.
    fn on_classified(
        &self,
        _context: &PassContext<'_>,
        _document: &mut Document,
        _ir: &mut IrTree,
    ) -> Result<()> {
        Ok(())
    }
}

/// A pass over the intermediate tree.
///
/// Registered as [`Feature::DirectiveClassifier`] or [`Feature::Optimization`]; within a
/// phase passes run in ascending [`IrPass::order`], ties in registration order.
pub trait IrPass: EngineFeature {
    /// Position within the phase, lower runs first
    fn order(&self) -> i32 {
        DEFAULT_FEATURE_ORDER
    }

    /// Run the pass.
    ///
    /// # Errors
    /// Returns an error only for wiring defects; problems with the template are reported as
    /// diagnostics on the tree.
    fn execute(
        &self,
        context: &PassContext<'_>,
        document: &mut Document,
        ir: &mut IrTree,
    ) -> Result<()>;
}

/// Lowers the intermediate tree into generated output.
pub trait TargetWriter: EngineFeature {
    /// Write `ir` as target output.
    ///
    /// # Errors
    /// Returns an error if the tree is malformed.
    fn write(
        &self,
        context: &PassContext<'_>,
        document: &Document,
        ir: &IrTree,
        options: &CodeGenerationOptions,
    ) -> Result<GeneratedOutput>;
}

/// A feature tagged with the capability it provides.
pub enum Feature {
    /// See [`ConfigureParserOptions`]
    ParserOptions(Box<dyn ConfigureParserOptions>),
    /// See [`ConfigureCodeGeneration`]
    CodeGenerationOptions(Box<dyn ConfigureCodeGeneration>),
    /// See [`DocumentClassifierPass`]
    DocumentClassifier(Box<dyn DocumentClassifierPass>),
    /// An [`IrPass`] run during directive classification
    DirectiveClassifier(Box<dyn IrPass>),
    /// An [`IrPass`] run during optimization
    Optimization(Box<dyn IrPass>),
    /// See [`SyntaxParser`]
    SyntaxParser(Box<dyn SyntaxParser>),
    /// See [`TargetWriter`]
    TargetWriter(Box<dyn TargetWriter>),
}

impl Feature {
    /// Wrap a parser options feature
    pub fn parser_options(feature: impl ConfigureParserOptions + 'static) -> Self {
        Feature::ParserOptions(Box::new(feature))
    }

    /// Wrap a code generation options feature
    pub fn code_generation(feature: impl ConfigureCodeGeneration + 'static) -> Self {
        Feature::CodeGenerationOptions(Box::new(feature))
    }

    /// Wrap a document classifier
    pub fn document_classifier(pass: impl DocumentClassifierPass + 'static) -> Self {
        Feature::DocumentClassifier(Box::new(pass))
    }

    /// Wrap a directive classification pass
    pub fn directive_classifier(pass: impl IrPass + 'static) -> Self {
        Feature::DirectiveClassifier(Box::new(pass))
    }

    /// Wrap an optimization pass
    pub fn optimization(pass: impl IrPass + 'static) -> Self {
        Feature::Optimization(Box::new(pass))
    }

    /// Wrap a syntax parser
    pub fn syntax_parser(parser: impl SyntaxParser + 'static) -> Self {
        Feature::SyntaxParser(Box::new(parser))
    }

    /// Wrap a target writer
    pub fn target_writer(writer: impl TargetWriter + 'static) -> Self {
        Feature::TargetWriter(Box::new(writer))
    }

    /// The capability this feature provides
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Feature::ParserOptions(_) => Capability::ParserOptions,
            Feature::CodeGenerationOptions(_) => Capability::CodeGenerationOptions,
            Feature::DocumentClassifier(_) => Capability::DocumentClassifier,
            Feature::DirectiveClassifier(_) => Capability::DirectiveClassifier,
            Feature::Optimization(_) => Capability::Optimization,
            Feature::SyntaxParser(_) => Capability::SyntaxParser,
            Feature::TargetWriter(_) => Capability::TargetWriter,
        }
    }

    /// Name of the wrapped feature
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Feature::ParserOptions(f) => f.name(),
            Feature::CodeGenerationOptions(f) => f.name(),
            Feature::DocumentClassifier(f) => f.name(),
            Feature::DirectiveClassifier(f) | Feature::Optimization(f) => f.name(),
            Feature::SyntaxParser(f) => f.name(),
            Feature::TargetWriter(f) => f.name(),
        }
    }

    pub(crate) fn initialize(&mut self, features: &FeatureIndex) -> Result<()> {
        match self {
            Feature::ParserOptions(f) => f.initialize(features),
            Feature::CodeGenerationOptions(f) => f.initialize(features),
            Feature::DocumentClassifier(f) => f.initialize(features),
            Feature::DirectiveClassifier(f) | Feature::Optimization(f) => f.initialize(features),
            Feature::SyntaxParser(f) => f.initialize(features),
            Feature::TargetWriter(f) => f.initialize(features),
        }
    }
}

impl std::fmt::Debug for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.capability(), self.name())
    }
}

/// Read-only view of the registered features, available during initialization and to passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureIndex {
    entries: Vec<(Capability, &'static str)>,
    capabilities: Capabilities,
}

impl FeatureIndex {
    /// Index `features` in registration order
    #[must_use]
    pub fn new(features: &[Feature]) -> Self {
        let entries: Vec<(Capability, &'static str)> = features
            .iter()
            .map(|feature| (feature.capability(), feature.name()))
            .collect();
        let capabilities = entries
            .iter()
            .fold(Capabilities::empty(), |set, (capability, _)| {
                set | capability.flag()
            });
        FeatureIndex {
            entries,
            capabilities,
        }
    }

    /// The set of registered capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// `true` if at least one feature provides `capability`
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability.flag())
    }

    /// `true` if a feature named `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(_, entry)| *entry == name)
    }

    /// Names of the features providing `capability`, in registration order
    pub fn names(&self, capability: Capability) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .filter(move |(c, _)| *c == capability)
            .map(|(_, name)| *name)
    }

    /// Fail unless some feature provides `capability`.
    ///
    /// # Errors
    /// Returns [`Error::MissingFeature`] naming `requester` if nothing provides it.
    pub fn require(&self, requester: &'static str, capability: Capability) -> Result<()> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(Error::MissingFeature {
                requester,
                capability,
            })
        }
    }
}

/// Registered features, bucketed per capability.
///
/// Pass buckets are sorted by order once, when the engine is built. Options features keep
/// registration order. For the single-provider capabilities (syntax parser and target
/// writer) the last registered feature is the one in effect, so an extension can replace a
/// default by registering its own.
#[derive(Default)]
pub struct FeatureRegistry {
    parser_options: Vec<Box<dyn ConfigureParserOptions>>,
    code_generation: Vec<Box<dyn ConfigureCodeGeneration>>,
    document_classifiers: Vec<Box<dyn DocumentClassifierPass>>,
    directive_classifiers: Vec<Box<dyn IrPass>>,
    optimizations: Vec<Box<dyn IrPass>>,
    syntax_parsers: Vec<Box<dyn SyntaxParser>>,
    target_writers: Vec<Box<dyn TargetWriter>>,
}

impl FeatureRegistry {
    /// Sort initialized features into buckets and order the pass buckets
    pub(crate) fn classify(features: Vec<Feature>) -> Self {
        let mut registry = FeatureRegistry::default();
        for feature in features {
            match feature {
                Feature::ParserOptions(f) => registry.parser_options.push(f),
                Feature::CodeGenerationOptions(f) => registry.code_generation.push(f),
                Feature::DocumentClassifier(f) => registry.document_classifiers.push(f),
                Feature::DirectiveClassifier(f) => registry.directive_classifiers.push(f),
                Feature::Optimization(f) => registry.optimizations.push(f),
                Feature::SyntaxParser(f) => registry.syntax_parsers.push(f),
                Feature::TargetWriter(f) => registry.target_writers.push(f),
            }
        }

        // sort_by_key is stable, ties keep registration order
        registry.document_classifiers.sort_by_key(|pass| pass.order());
        registry.directive_classifiers.sort_by_key(|pass| pass.order());
        registry.optimizations.sort_by_key(|pass| pass.order());
        registry
    }

    /// Parser options features in registration order
    #[must_use]
    pub fn parser_options(&self) -> &[Box<dyn ConfigureParserOptions>] {
        &self.parser_options
    }

    /// Code generation options features in registration order
    #[must_use]
    pub fn code_generation(&self) -> &[Box<dyn ConfigureCodeGeneration>] {
        &self.code_generation
    }

    /// Document classifiers in execution order
    #[must_use]
    pub fn document_classifiers(&self) -> &[Box<dyn DocumentClassifierPass>] {
        &self.document_classifiers
    }

    /// Directive classification passes in execution order
    #[must_use]
    pub fn directive_classifiers(&self) -> &[Box<dyn IrPass>] {
        &self.directive_classifiers
    }

    /// Optimization passes in execution order
    #[must_use]
    pub fn optimizations(&self) -> &[Box<dyn IrPass>] {
        &self.optimizations
    }

    /// The syntax parser in effect
    #[must_use]
    pub fn syntax_parser(&self) -> Option<&dyn SyntaxParser> {
        self.syntax_parsers.last().map(|parser| parser.as_ref())
    }

    /// The target writer in effect
    #[must_use]
    pub fn target_writer(&self) -> Option<&dyn TargetWriter> {
        self.target_writers.last().map(|writer| writer.as_ref())
    }
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn names<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
            iter.collect()
        }

        f.debug_struct("FeatureRegistry")
            .field("parser_options", &names(self.parser_options.iter().map(|x| x.name())))
            .field("code_generation", &names(self.code_generation.iter().map(|x| x.name())))
            .field(
                "document_classifiers",
                &names(self.document_classifiers.iter().map(|x| x.name())),
            )
            .field(
                "directive_classifiers",
                &names(self.directive_classifiers.iter().map(|x| x.name())),
            )
            .field("optimizations", &names(self.optimizations.iter().map(|x| x.name())))
            .field("syntax_parsers", &names(self.syntax_parsers.iter().map(|x| x.name())))
            .field("target_writers", &names(self.target_writers.iter().map(|x| x.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ordered(&'static str, i32);

    impl EngineFeature for Ordered {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    impl IrPass for Ordered {
        fn order(&self) -> i32 {
            self.1
        }

        fn execute(&self, _: &PassContext<'_>, _: &mut Document, _: &mut IrTree) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_index_capabilities() {
        let features = vec![
            Feature::optimization(Ordered("a", 1)),
            Feature::directive_classifier(Ordered("b", 1)),
            Feature::optimization(Ordered("c", 1)),
        ];
        let index = FeatureIndex::new(&features);

        assert!(index.has(Capability::Optimization));
        assert!(!index.has(Capability::TargetWriter));
        assert!(index.contains("b"));
        assert_eq!(
            index.names(Capability::Optimization).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert!(matches!(
            index.require("writer-user", Capability::TargetWriter),
            Err(Error::MissingFeature {
                requester: "writer-user",
                capability: Capability::TargetWriter
            })
        ));
    }

    #[test]
    fn test_classify_sorts_stably() {
        let registry = FeatureRegistry::classify(vec![
            Feature::optimization(Ordered("late", 20)),
            Feature::optimization(Ordered("first-tie", 10)),
            Feature::directive_classifier(Ordered("other-bucket", 0)),
            Feature::optimization(Ordered("second-tie", 10)),
            Feature::optimization(Ordered("early", -5)),
        ]);

        let names: Vec<&str> = registry.optimizations().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["early", "first-tie", "second-tie", "late"]);
        assert_eq!(registry.directive_classifiers().len(), 1);
        assert!(registry.syntax_parser().is_none());
    }
}
