//! The phased compilation engine.
//!
//! An [`Engine`] is an ordered, immutable list of [`Phase`]s plus a [`FeatureRegistry`] of
//! pluggable features sorted into one bucket per [`Capability`]. It is assembled once through
//! an [`EngineBuilder`] and then compiles any number of [`Document`]s, sequentially per
//! document and in parallel across documents.
//!
//! # Pipeline
//!
//! | Phase | Consumes | Produces |
//! |---|---|---|
//! | [`PhaseKind::Parsing`] | source, imports | syntax trees |
//! | [`PhaseKind::IrLowering`] | syntax trees | intermediate tree |
//! | [`PhaseKind::DocumentClassification`] | intermediate tree | document kind |
//! | [`PhaseKind::DirectiveClassification`] | intermediate tree | bound tag helpers |
//! | [`PhaseKind::Optimization`] | intermediate tree | reduced intermediate tree |
//! | [`PhaseKind::TargetLowering`] | intermediate tree | generated output |
//!
//! # Examples
//!
//! ```rust
//! use tagscope::{Document, Engine, SourceDocument};
//!
//! let engine = Engine::create()?;
//! let mut document = Document::new(SourceDocument::new("hello.tag", "<b>@Name</b>"));
//! engine.process(&mut document)?;
//!
//! let code = document.generated_output().map(|o| o.code()).unwrap_or_default();
//! assert!(code.contains("WriteExpression(Name)"));
//! # Ok::<(), tagscope::Error>(())
//! ```

mod builder;
mod capability;
mod config;
mod feature;
mod options;
mod phase;

use std::sync::Arc;

use rayon::prelude::*;

pub use builder::{CodeGenerationCallback, EngineBuilder, Extension, ParserOptionsCallback};
pub use capability::{Capabilities, Capability, PhaseKind};
pub use config::EngineConfig;
pub use feature::{
    ConfigureCodeGeneration, ConfigureParserOptions, DocumentClassifierPass, EngineFeature,
    Feature, FeatureIndex, FeatureRegistry, IrPass, PassContext, TargetWriter,
    DEFAULT_FEATURE_ORDER,
};
pub use options::{
    CodeGenerationOptions, CodeGenerationOptionsBuilder, DirectiveDescriptor, DirectiveKind,
    DirectiveTokenKind, DirectiveUsage, ParserOptions, ParserOptionsBuilder,
};
pub use phase::{
    default_phases, DirectiveClassificationPhase, DocumentClassificationPhase, IrLoweringPhase,
    OptimizationPhase, ParsingPhase, Phase, TargetLoweringPhase,
};

use crate::{document::Document, Result};

/// A built compilation pipeline.
///
/// The engine is immutable and `Send + Sync`; share it by reference across threads.
pub struct Engine {
    config: EngineConfig,
    phases: Vec<Box<dyn Phase>>,
    features: FeatureRegistry,
    index: FeatureIndex,
    parser_callbacks: Vec<ParserOptionsCallback>,
    code_generation_callbacks: Vec<CodeGenerationCallback>,
}

impl Engine {
    /// An engine with the standard phases and default features
    ///
    /// # Errors
    /// Returns an error if a default feature fails to initialize.
    pub fn create() -> Result<Engine> {
        EngineBuilder::with_defaults().build()
    }

    /// An engine with the default features, adjusted by `configure`
    ///
    /// # Errors
    /// Returns an error if a feature fails to initialize.
    pub fn create_with<F>(configure: F) -> Result<Engine>
    where
        F: FnOnce(&mut EngineBuilder),
    {
        let mut builder = EngineBuilder::with_defaults();
        configure(&mut builder);
        builder.build()
    }

    /// A builder with the standard phases and no features
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The base configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered features by capability
    #[must_use]
    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    /// Index of registered feature names
    #[must_use]
    pub fn feature_index(&self) -> &FeatureIndex {
        &self.index
    }

    /// Phase kinds in execution order
    pub fn phases(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.phases.iter().map(|phase| phase.kind())
    }

    /// Context handed to passes of `phase`
    #[must_use]
    pub fn pass_context(&self, phase: PhaseKind) -> PassContext<'_> {
        PassContext {
            phase,
            config: &self.config,
            features: &self.index,
        }
    }

    /// Compose a parser options snapshot: configuration, callbacks, then features in
    /// registration order
    #[must_use]
    pub fn parser_options(&self) -> Arc<ParserOptions> {
        let mut builder = ParserOptionsBuilder::new(&self.config);
        for callback in &self.parser_callbacks {
            callback(&mut builder);
        }
        for feature in self.features.parser_options() {
            feature.configure(&mut builder);
        }
        builder.build()
    }

    /// Compose a code generation options snapshot: configuration, callbacks, then features in
    /// registration order
    #[must_use]
    pub fn code_generation_options(&self) -> Arc<CodeGenerationOptions> {
        let mut builder = CodeGenerationOptionsBuilder::new(&self.config);
        for callback in &self.code_generation_callbacks {
            callback(&mut builder);
        }
        for feature in self.features.code_generation() {
            feature.configure(&mut builder);
        }
        builder.build()
    }

    /// Run every phase against `document`, in order.
    ///
    /// # Errors
    /// Returns the first wiring error; the document keeps every artifact produced before it.
    /// Problems with the template itself are diagnostics, see
    /// [`Document::all_diagnostics`].
    pub fn process(&self, document: &mut Document) -> Result<()> {
        log::debug!(
            "processing '{}'",
            document.source().file_path().unwrap_or("<anonymous>")
        );
        for phase in &self.phases {
            log::debug!("running phase {}", phase.name());
            phase.execute(self, document)?;
        }
        Ok(())
    }

    /// Process independent documents in parallel.
    ///
    /// Each document is still compiled sequentially. Results are returned in input order,
    /// each paired with its document.
    #[must_use]
    pub fn process_batch(&self, documents: Vec<Document>) -> Vec<(Document, Result<()>)> {
        documents
            .into_par_iter()
            .map(|mut document| {
                let result = self.process(&mut document);
                (document, result)
            })
            .collect()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("phases", &self.phases.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{document::SourceDocument, ir::IrTree, Error};

    struct Recorder {
        name: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EngineFeature for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }
    }

    impl IrPass for Recorder {
        fn order(&self) -> i32 {
            self.order
        }

        fn execute(&self, _: &PassContext<'_>, _: &mut Document, _: &mut IrTree) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl EngineFeature for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    impl IrPass for Failing {
        fn execute(&self, _: &PassContext<'_>, _: &mut Document, _: &mut IrTree) -> Result<()> {
            Err(config_error!("pass failed"))
        }
    }

    struct NeedsWriter;

    impl EngineFeature for NeedsWriter {
        fn name(&self) -> &'static str {
            "NeedsWriter"
        }

        fn initialize(&mut self, features: &FeatureIndex) -> Result<()> {
            features.require(self.name(), Capability::TargetWriter)
        }
    }

    impl ConfigureParserOptions for NeedsWriter {
        fn configure(&self, _: &mut ParserOptionsBuilder) {}
    }

    #[test]
    fn test_empty_builder_misses_parser() {
        let result = Engine::builder().build();
        assert!(matches!(
            result,
            Err(Error::MissingFeature {
                requester: "ParsingPhase",
                capability: Capability::SyntaxParser
            })
        ));
    }

    #[test]
    fn test_feature_initialize_can_fail() {
        let mut builder = Engine::builder();
        builder.add_feature(Feature::parser_options(NeedsWriter));
        assert!(matches!(
            builder.build(),
            Err(Error::MissingFeature {
                requester: "NeedsWriter",
                ..
            })
        ));
    }

    #[test]
    fn test_passes_run_in_stable_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |name, order| Recorder {
            name,
            order,
            log: Arc::clone(&log),
        };

        let engine = Engine::create_with(|builder| {
            builder
                .add_feature(Feature::optimization(recorder("opt-b", 2000)))
                .add_feature(Feature::directive_classifier(recorder("dir-a", 5)))
                .add_feature(Feature::optimization(recorder("opt-a1", 10)))
                .add_feature(Feature::optimization(recorder("opt-a2", 10)));
        })
        .unwrap();

        let mut document = Document::new(SourceDocument::new("a.tag", "<p></p>"));
        engine.process(&mut document).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["dir-a", "opt-a1", "opt-a2", "opt-b"]
        );
        assert!(document.generated_output().is_some());
    }

    #[test]
    fn test_phases_in_declared_order() {
        let engine = Engine::create().unwrap();
        let phases: Vec<PhaseKind> = engine.phases().collect();
        assert_eq!(
            phases,
            vec![
                PhaseKind::Parsing,
                PhaseKind::IrLowering,
                PhaseKind::DocumentClassification,
                PhaseKind::DirectiveClassification,
                PhaseKind::Optimization,
                PhaseKind::TargetLowering,
            ]
        );
    }

    #[test]
    fn test_failing_pass_keeps_ir() {
        let engine = Engine::create_with(|builder| {
            builder.add_feature(Feature::optimization(Failing));
        })
        .unwrap();

        let mut document = Document::new(SourceDocument::new("a.tag", "<p></p>"));
        assert!(matches!(
            engine.process(&mut document),
            Err(Error::Configuration { .. })
        ));
        assert!(document.ir_tree().is_some());
        assert!(document.generated_output().is_none());
    }

    #[test]
    fn test_options_composition_order() {
        let engine = Engine::create_with(|builder| {
            builder
                .with_config(EngineConfig {
                    case_sensitive_tags: true,
                    ..EngineConfig::default()
                })
                .configure_parser_options(|options| {
                    options.set_case_sensitive_tags(false).add_directive(
                        DirectiveDescriptor::single_line(
                            "addTagHelper",
                            DirectiveUsage::Unrestricted,
                            vec![],
                        ),
                    );
                });
        })
        .unwrap();

        let options = engine.parser_options();
        assert!(!options.case_sensitive_tags());
        // the directive feature registered by default runs after the callback and wins
        assert_eq!(
            options.directive("addTagHelper").map(|d| d.usage),
            Some(DirectiveUsage::FileScopedMultipleOccurring)
        );
    }

    #[test]
    fn test_preset_options_are_reused() {
        let engine = Engine::create().unwrap();
        let mut document = Document::new(SourceDocument::new("a.tag", "<p></p>"));
        let preset = ParserOptionsBuilder::new(&EngineConfig::design_time()).build();
        document.set_parser_options(Arc::clone(&preset));

        engine.process(&mut document).unwrap();
        assert!(Arc::ptr_eq(document.parser_options().unwrap(), &preset));
        assert!(document.code_generation_options().is_some());
    }

    #[test]
    fn test_process_batch_keeps_order() {
        let engine = Engine::create().unwrap();
        let documents: Vec<Document> = (0..16)
            .map(|i| Document::new(SourceDocument::new(format!("{i}.tag"), format!("<p>{i}</p>"))))
            .collect();

        let results = engine.process_batch(documents);
        assert_eq!(results.len(), 16);
        for (i, (document, result)) in results.iter().enumerate() {
            assert!(result.is_ok());
            assert_eq!(document.source().file_path(), Some(format!("{i}.tag").as_str()));
            assert!(document.generated_output().is_some());
        }
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<Document>();
    }
}
