//! Engine assembly.

use crate::{
    engine::{
        default_phases, CodeGenerationOptionsBuilder, Engine, EngineConfig, Feature, FeatureIndex,
        FeatureRegistry, ParserOptionsBuilder, Phase,
    },
    passes, Result,
};

/// Caller-supplied parser options callback
pub type ParserOptionsCallback = Box<dyn Fn(&mut ParserOptionsBuilder) + Send + Sync>;

/// Caller-supplied code generation options callback
pub type CodeGenerationCallback = Box<dyn Fn(&mut CodeGenerationOptionsBuilder) + Send + Sync>;

/// A named bundle of features registered in one call.
///
/// Extensions are registered explicitly through [`EngineBuilder::add_extension`]; nothing is
/// discovered at runtime.
pub trait Extension {
    /// Name for logging
    fn name(&self) -> &'static str;

    /// Add this extension's features and callbacks to `builder`
    fn register(&self, builder: &mut EngineBuilder);
}

/// Collects configuration, features and phases for an [`Engine`].
///
/// # Examples
///
/// ```rust
/// use tagscope::{engine::EngineConfig, EngineBuilder};
///
/// let mut builder = EngineBuilder::with_defaults();
/// builder
///     .with_config(EngineConfig::design_time())
///     .configure_parser_options(|options| {
///         options.set_case_sensitive_tags(true);
///     });
/// let engine = builder.build()?;
/// assert!(engine.parser_options().case_sensitive_tags());
/// # Ok::<(), tagscope::Error>(())
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    features: Vec<Feature>,
    phases: Vec<Box<dyn Phase>>,
    parser_callbacks: Vec<ParserOptionsCallback>,
    code_generation_callbacks: Vec<CodeGenerationCallback>,
}

impl EngineBuilder {
    /// A builder with the standard phases and no features
    #[must_use]
    pub fn new() -> Self {
        EngineBuilder {
            config: EngineConfig::default(),
            features: Vec::new(),
            phases: default_phases(),
            parser_callbacks: Vec::new(),
            code_generation_callbacks: Vec::new(),
        }
    }

    /// A builder with the standard phases and the default features
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        builder.features.extend(passes::default_features());
        builder
    }

    /// Replace the base configuration
    pub fn with_config(&mut self, config: EngineConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Register a feature
    pub fn add_feature(&mut self, feature: Feature) -> &mut Self {
        self.features.push(feature);
        self
    }

    /// Register every feature of `extension`
    pub fn add_extension(&mut self, extension: &dyn Extension) -> &mut Self {
        log::debug!("registering extension '{}'", extension.name());
        extension.register(self);
        self
    }

    /// Adjust parser options before any parser options feature runs
    pub fn configure_parser_options<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut ParserOptionsBuilder) + Send + Sync + 'static,
    {
        self.parser_callbacks.push(Box::new(callback));
        self
    }

    /// Adjust code generation options before any code generation feature runs
    pub fn configure_code_generation<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut CodeGenerationOptionsBuilder) + Send + Sync + 'static,
    {
        self.code_generation_callbacks.push(Box::new(callback));
        self
    }

    /// Append a phase after the ones already listed
    pub fn add_phase(&mut self, phase: Box<dyn Phase>) -> &mut Self {
        self.phases.push(phase);
        self
    }

    /// Replace the phase list
    pub fn set_phases(&mut self, phases: Vec<Box<dyn Phase>>) -> &mut Self {
        self.phases = phases;
        self
    }

    /// Features registered so far
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Initialize every feature and phase and freeze the engine.
    ///
    /// Features and phases are initialized once each, in registration order, against an index
    /// of all registered features. Pass buckets are then sorted by order.
    ///
    /// # Errors
    /// Returns the first initialization error, typically [`crate::Error::MissingFeature`].
    pub fn build(mut self) -> Result<Engine> {
        let index = FeatureIndex::new(&self.features);

        for feature in &mut self.features {
            log::debug!("initializing feature {feature:?}");
            feature.initialize(&index)?;
        }
        for phase in &mut self.phases {
            phase.initialize(&index)?;
        }

        let features = FeatureRegistry::classify(self.features);
        log::debug!(
            "built engine with {} phases and {} capabilities",
            self.phases.len(),
            index.capabilities().bits().count_ones()
        );

        Ok(Engine {
            config: self.config,
            phases: self.phases,
            features,
            index,
            parser_callbacks: self.parser_callbacks,
            code_generation_callbacks: self.code_generation_callbacks,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("features", &self.features)
            .field("phases", &self.phases.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
