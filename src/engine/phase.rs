//! The standard pipeline phases.
//!
//! Each phase consumes the artifact its predecessor stored on the [`Document`] and fails with
//! [`crate::Error::MissingDocumentDependency`] when it is absent. Phases that rewrite the
//! intermediate tree move it out of the document, run their passes against it, and store it
//! back whether or not a pass failed.

use std::{collections::HashSet, sync::Arc};

use crate::{
    diagnostics::factory,
    document::Document,
    engine::{
        Capability, DirectiveUsage, Engine, FeatureIndex, IrPass, ParserOptions, PhaseKind,
    },
    ir::{HtmlAttribute, IrNode, IrTree, NodeId, NodeKind},
    syntax::{SyntaxNode, SyntaxTree},
    Error, Result,
};

/// A stage of the pipeline.
///
/// Phases run strictly in the order the engine lists them, one document at a time.
pub trait Phase: Send + Sync {
    /// Which standard stage this phase implements
    fn kind(&self) -> PhaseKind;

    /// Name for logging and errors
    fn name(&self) -> &'static str;

    /// Called exactly once while the engine is built, alongside every feature.
    ///
    /// # Errors
    /// Returns [`Error::MissingFeature`] if a capability the phase relies on is missing.
    fn initialize(&mut self, features: &FeatureIndex) -> Result<()>;

    /// Run the phase against `document`.
    ///
    /// # Errors
    /// Returns an error if a required artifact is missing or a pass reports a wiring defect.
    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()>;
}

/// The standard phase sequence
#[must_use]
pub fn default_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(ParsingPhase::default()),
        Box::new(IrLoweringPhase::default()),
        Box::new(DocumentClassificationPhase::default()),
        Box::new(DirectiveClassificationPhase::default()),
        Box::new(OptimizationPhase::default()),
        Box::new(TargetLoweringPhase::default()),
    ]
}

fn ensure_initialized(initialized: bool, name: &'static str) -> Result<()> {
    if initialized {
        Ok(())
    } else {
        Err(Error::NotInitialized(name))
    }
}

/// Run `passes` in order against the document's intermediate tree
fn run_ir_passes(
    phase: PhaseKind,
    passes: &[Box<dyn IrPass>],
    engine: &Engine,
    document: &mut Document,
) -> Result<()> {
    let mut ir = document.take_ir_tree(phase)?;
    let context = engine.pass_context(phase);

    let mut result = Ok(());
    for pass in passes {
        log::debug!("{phase}: running pass '{}' (order {})", pass.name(), pass.order());
        result = pass.execute(&context, document, &mut ir);
        if result.is_err() {
            break;
        }
    }

    document.set_ir_tree(ir);
    result
}

/// Parses the source and every import with the registered [`crate::syntax::SyntaxParser`].
///
/// Parser options are composed once per document; a snapshot preset on the document is used
/// as is.
#[derive(Debug, Default)]
pub struct ParsingPhase {
    initialized: bool,
}

impl Phase for ParsingPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Parsing
    }

    fn name(&self) -> &'static str {
        "ParsingPhase"
    }

    fn initialize(&mut self, features: &FeatureIndex) -> Result<()> {
        features.require(self.name(), Capability::SyntaxParser)?;
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        let parser = engine
            .features()
            .syntax_parser()
            .ok_or(Error::MissingFeature {
                requester: self.name(),
                capability: Capability::SyntaxParser,
            })?;

        let options = match document.parser_options() {
            Some(options) => Arc::clone(options),
            None => {
                let options = engine.parser_options();
                document.set_parser_options(Arc::clone(&options));
                options
            }
        };

        log::debug!("{}: parsing with '{}'", self.kind(), parser.name());
        let tree = parser.parse(document.source(), &options);
        let imports = document
            .imports()
            .iter()
            .map(|import| parser.parse(import, &options))
            .collect();

        document.set_syntax_tree(tree);
        document.set_import_syntax_trees(imports);
        Ok(())
    }
}

/// Lowers the syntax trees into one intermediate tree.
///
/// Directives of the imports come first, flagged as imported, followed by the main
/// document's content. A file-scoped singly-occurring directive repeated in the main document
/// gets a duplicate-directive diagnostic on every repetition.
#[derive(Debug, Default)]
pub struct IrLoweringPhase {
    initialized: bool,
}

impl IrLoweringPhase {
    fn lower_imports(ir: &mut IrTree, imports: &[SyntaxTree]) -> Result<()> {
        let root = ir.root();
        for import in imports {
            for directive in import.directives() {
                if let SyntaxNode::Directive { name, tokens, span } = directive {
                    let node = IrNode::new(NodeKind::Directive {
                        name: name.clone(),
                        tokens: tokens.clone(),
                        imported: true,
                    })
                    .with_span(Some(*span));
                    ir.add_child(root, node)?;
                }
            }
        }
        Ok(())
    }

    /// Lower `nodes` under `root` in source order, one work frame per open element
    fn lower_nodes(
        ir: &mut IrTree,
        root: NodeId,
        nodes: &[SyntaxNode],
        options: &ParserOptions,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        let mut pending = vec![(root, nodes.iter())];

        while let Some((parent, siblings)) = pending.last_mut() {
            let parent = *parent;
            let Some(node) = siblings.next() else {
                pending.pop();
                continue;
            };

            let lowered = match node {
                SyntaxNode::Text { content, span } => IrNode::new(NodeKind::HtmlContent {
                    content: content.clone(),
                })
                .with_span(Some(*span)),
                SyntaxNode::Expression { code, span } => {
                    IrNode::new(NodeKind::Expression { code: code.clone() }).with_span(Some(*span))
                }
                SyntaxNode::Directive { name, tokens, span } => {
                    let mut diagnostics = Vec::new();
                    let singly = options.directive(name).is_some_and(|directive| {
                        directive.usage == DirectiveUsage::FileScopedSinglyOccurring
                    });
                    if singly && !seen.insert(name.clone()) {
                        diagnostics.push(factory::duplicate_directive(Some(*span), name));
                    }

                    IrNode::new(NodeKind::Directive {
                        name: name.clone(),
                        tokens: tokens.clone(),
                        imported: false,
                    })
                    .with_span(Some(*span))
                    .with_diagnostics(diagnostics)
                }
                SyntaxNode::Element(element) => {
                    let lowered = IrNode::new(NodeKind::Element {
                        name: element.name.clone(),
                        attributes: element
                            .attributes
                            .iter()
                            .map(|attribute| HtmlAttribute {
                                name: attribute.name.clone(),
                                value: attribute.value.clone(),
                            })
                            .collect(),
                        tag_mode: element.tag_mode,
                    })
                    .with_span(Some(element.span));
                    let id = ir.add_child(parent, lowered)?;
                    pending.push((id, element.children.iter()));
                    continue;
                }
            };
            ir.add_child(parent, lowered)?;
        }
        Ok(())
    }
}

impl Phase for IrLoweringPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::IrLowering
    }

    fn name(&self) -> &'static str {
        "IrLoweringPhase"
    }

    fn initialize(&mut self, _features: &FeatureIndex) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, _engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        let syntax = document.require_syntax_tree(self.kind())?;
        let imports = document.require_import_syntax_trees(self.kind())?;

        let mut ir = IrTree::new();
        Self::lower_imports(&mut ir, imports)?;
        let root = ir.root();
        Self::lower_nodes(&mut ir, root, syntax.nodes(), syntax.options())?;

        log::debug!("{}: lowered {} nodes", self.kind(), ir.arena_len());
        document.set_ir_tree(ir);
        Ok(())
    }
}

/// Assigns the document kind through the registered classifiers.
#[derive(Debug, Default)]
pub struct DocumentClassificationPhase {
    initialized: bool,
}

impl DocumentClassificationPhase {
    fn classify(&self, engine: &Engine, document: &mut Document, ir: &mut IrTree) -> Result<()> {
        let context = engine.pass_context(self.kind());
        for classifier in engine.features().document_classifiers() {
            if let Some(kind) = ir.document_kind() {
                log::debug!("{}: document already classified as '{kind}'", self.kind());
                break;
            }

            if classifier.is_match(document, ir) {
                log::debug!(
                    "{}: '{}' claimed the document as '{}'",
                    self.kind(),
                    classifier.name(),
                    classifier.document_kind()
                );
                ir.set_document_kind(classifier.document_kind());
                classifier.on_classified(&context, document, ir)?;
            }
        }
        Ok(())
    }
}

impl Phase for DocumentClassificationPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::DocumentClassification
    }

    fn name(&self) -> &'static str {
        "DocumentClassificationPhase"
    }

    fn initialize(&mut self, _features: &FeatureIndex) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        let mut ir = document.take_ir_tree(self.kind())?;
        let result = self.classify(engine, document, &mut ir);
        document.set_ir_tree(ir);
        result
    }
}

/// Runs the directive classification passes.
#[derive(Debug, Default)]
pub struct DirectiveClassificationPhase {
    initialized: bool,
}

impl Phase for DirectiveClassificationPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::DirectiveClassification
    }

    fn name(&self) -> &'static str {
        "DirectiveClassificationPhase"
    }

    fn initialize(&mut self, _features: &FeatureIndex) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        run_ir_passes(
            self.kind(),
            engine.features().directive_classifiers(),
            engine,
            document,
        )
    }
}

/// Runs the optimization passes.
#[derive(Debug, Default)]
pub struct OptimizationPhase {
    initialized: bool,
}

impl Phase for OptimizationPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Optimization
    }

    fn name(&self) -> &'static str {
        "OptimizationPhase"
    }

    fn initialize(&mut self, _features: &FeatureIndex) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        run_ir_passes(self.kind(), engine.features().optimizations(), engine, document)
    }
}

/// Writes the generated output with the registered [`crate::engine::TargetWriter`].
#[derive(Debug, Default)]
pub struct TargetLoweringPhase {
    initialized: bool,
}

impl Phase for TargetLoweringPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::TargetLowering
    }

    fn name(&self) -> &'static str {
        "TargetLoweringPhase"
    }

    fn initialize(&mut self, features: &FeatureIndex) -> Result<()> {
        features.require(self.name(), Capability::TargetWriter)?;
        self.initialized = true;
        Ok(())
    }

    fn execute(&self, engine: &Engine, document: &mut Document) -> Result<()> {
        ensure_initialized(self.initialized, self.name())?;
        let writer = engine
            .features()
            .target_writer()
            .ok_or(Error::MissingFeature {
                requester: self.name(),
                capability: Capability::TargetWriter,
            })?;

        let options = match document.code_generation_options() {
            Some(options) => Arc::clone(options),
            None => {
                let options = engine.code_generation_options();
                document.set_code_generation_options(Arc::clone(&options));
                options
            }
        };

        let context = engine.pass_context(self.kind());
        let ir = document.require_ir_tree(self.kind())?;
        log::debug!("{}: writing with '{}'", self.kind(), writer.name());
        let output = writer.write(&context, document, ir, &options)?;
        document.set_generated_output(output);
        Ok(())
    }
}
