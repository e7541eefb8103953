//! The per-compilation container of pipeline artifacts.
//!
//! A [`Document`] is created from a [`SourceDocument`] (plus optional imports), handed to
//! [`crate::Engine::process`], and read back afterwards. Every phase reads the artifact its
//! predecessor wrote into one of the document's slots and writes its own result into the next
//! one. Reading an empty slot through a `require_*` accessor is a wiring defect and fails with
//! [`crate::Error::MissingDocumentDependency`].
//!
//! # Slots
//!
//! | Slot | Written by |
//! |------|------------|
//! | parser options | parsing phase (unless preset) |
//! | syntax tree, import syntax trees | parsing phase |
//! | intermediate tree | IR lowering, rewritten by later phases |
//! | tag helper context | directive classification (unless preset) |
//! | code generation options | target lowering (unless preset) |
//! | generated output | target lowering |
//!
//! Setting a slot twice overwrites it. Extensions keep their own data in the typed
//! [`ItemBag`].

mod context;
mod items;
mod output;
mod source;

use std::sync::Arc;

pub use context::TagHelperContext;
pub use items::{ItemBag, ItemKey};
pub use output::GeneratedOutput;
pub use source::{SourceDocument, SourceSpan};

use crate::{
    descriptors::TagDescriptor,
    diagnostics::{Diagnostic, HasDiagnostics},
    engine::{CodeGenerationOptions, ParserOptions, PhaseKind},
    ir::IrTree,
    syntax::SyntaxTree,
    Error, Result,
};

/// Mutable container of everything one compilation produces.
#[derive(Debug)]
pub struct Document {
    source: SourceDocument,
    imports: Vec<SourceDocument>,
    syntax_tree: Option<SyntaxTree>,
    import_syntax_trees: Option<Vec<SyntaxTree>>,
    ir_tree: Option<IrTree>,
    generated_output: Option<GeneratedOutput>,
    parser_options: Option<Arc<ParserOptions>>,
    code_generation_options: Option<Arc<CodeGenerationOptions>>,
    tag_helpers: Option<Vec<Arc<TagDescriptor>>>,
    tag_helper_context: Option<TagHelperContext>,
    diagnostics: Vec<Diagnostic>,
    items: ItemBag,
}

impl Document {
    /// Create a document without imports
    #[must_use]
    pub fn new(source: SourceDocument) -> Self {
        Self::with_imports(source, Vec::new())
    }

    /// Create a document whose directives are preceded by those of `imports`, in order
    #[must_use]
    pub fn with_imports(source: SourceDocument, imports: Vec<SourceDocument>) -> Self {
        Document {
            source,
            imports,
            syntax_tree: None,
            import_syntax_trees: None,
            ir_tree: None,
            generated_output: None,
            parser_options: None,
            code_generation_options: None,
            tag_helpers: None,
            tag_helper_context: None,
            diagnostics: Vec::new(),
            items: ItemBag::default(),
        }
    }

    /// The main source
    #[must_use]
    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    /// Import sources, in application order
    #[must_use]
    pub fn imports(&self) -> &[SourceDocument] {
        &self.imports
    }

    /// The syntax tree of the main source
    #[must_use]
    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        self.syntax_tree.as_ref()
    }

    /// Store the syntax tree of the main source
    pub fn set_syntax_tree(&mut self, tree: SyntaxTree) {
        self.syntax_tree = Some(tree);
    }

    /// The syntax tree of the main source, or a dependency error for `phase`
    ///
    /// # Errors
    /// Returns [`Error::MissingDocumentDependency`] if the slot is empty.
    pub fn require_syntax_tree(&self, phase: PhaseKind) -> Result<&SyntaxTree> {
        self.syntax_tree
            .as_ref()
            .ok_or(Error::MissingDocumentDependency {
                phase,
                artifact: "syntax tree",
            })
    }

    /// One syntax tree per import, in import order
    #[must_use]
    pub fn import_syntax_trees(&self) -> Option<&[SyntaxTree]> {
        self.import_syntax_trees.as_deref()
    }

    /// Store the import syntax trees
    pub fn set_import_syntax_trees(&mut self, trees: Vec<SyntaxTree>) {
        self.import_syntax_trees = Some(trees);
    }

    /// The import syntax trees, or a dependency error for `phase`
    ///
    /// # Errors
    /// Returns [`Error::MissingDocumentDependency`] if the slot is empty.
    pub fn require_import_syntax_trees(&self, phase: PhaseKind) -> Result<&[SyntaxTree]> {
        self.import_syntax_trees
            .as_deref()
            .ok_or(Error::MissingDocumentDependency {
                phase,
                artifact: "import syntax tree list",
            })
    }

    /// The intermediate tree
    #[must_use]
    pub fn ir_tree(&self) -> Option<&IrTree> {
        self.ir_tree.as_ref()
    }

    /// Store the intermediate tree
    pub fn set_ir_tree(&mut self, tree: IrTree) {
        self.ir_tree = Some(tree);
    }

    /// Move the intermediate tree out for rewriting, or fail with a dependency error for `phase`
    ///
    /// Phases take the tree, run their passes against it and store it back with
    /// [`Document::set_ir_tree`].
    ///
    /// # Errors
    /// Returns [`Error::MissingDocumentDependency`] if the slot is empty.
    pub fn take_ir_tree(&mut self, phase: PhaseKind) -> Result<IrTree> {
        self.ir_tree.take().ok_or(Error::MissingDocumentDependency {
            phase,
            artifact: "intermediate tree",
        })
    }

    /// The intermediate tree, or a dependency error for `phase`
    ///
    /// # Errors
    /// Returns [`Error::MissingDocumentDependency`] if the slot is empty.
    pub fn require_ir_tree(&self, phase: PhaseKind) -> Result<&IrTree> {
        self.ir_tree.as_ref().ok_or(Error::MissingDocumentDependency {
            phase,
            artifact: "intermediate tree",
        })
    }

    /// The generated output
    #[must_use]
    pub fn generated_output(&self) -> Option<&GeneratedOutput> {
        self.generated_output.as_ref()
    }

    /// Store the generated output
    pub fn set_generated_output(&mut self, output: GeneratedOutput) {
        self.generated_output = Some(output);
    }

    /// The parser options snapshot
    #[must_use]
    pub fn parser_options(&self) -> Option<&Arc<ParserOptions>> {
        self.parser_options.as_ref()
    }

    /// Preset or store the parser options snapshot
    pub fn set_parser_options(&mut self, options: Arc<ParserOptions>) {
        self.parser_options = Some(options);
    }

    /// The code generation options snapshot
    #[must_use]
    pub fn code_generation_options(&self) -> Option<&Arc<CodeGenerationOptions>> {
        self.code_generation_options.as_ref()
    }

    /// Preset or store the code generation options snapshot
    pub fn set_code_generation_options(&mut self, options: Arc<CodeGenerationOptions>) {
        self.code_generation_options = Some(options);
    }

    /// Descriptors the directives of this document may bring into scope
    #[must_use]
    pub fn tag_helpers(&self) -> Option<&[Arc<TagDescriptor>]> {
        self.tag_helpers.as_deref()
    }

    /// Store the descriptors available to this document
    pub fn set_tag_helpers(&mut self, descriptors: Vec<Arc<TagDescriptor>>) {
        self.tag_helpers = Some(descriptors);
    }

    /// The tag helpers in scope after directive resolution
    #[must_use]
    pub fn tag_helper_context(&self) -> Option<&TagHelperContext> {
        self.tag_helper_context.as_ref()
    }

    /// Preset or store the tag helper context
    pub fn set_tag_helper_context(&mut self, context: TagHelperContext) {
        self.tag_helper_context = Some(context);
    }

    /// Record a document-level diagnostic
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Extension data
    #[must_use]
    pub fn items(&self) -> &ItemBag {
        &self.items
    }

    /// Mutable extension data
    pub fn items_mut(&mut self) -> &mut ItemBag {
        &mut self.items
    }

    /// Every diagnostic produced so far: syntax trees, document, intermediate tree and output
    #[must_use]
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = Vec::new();
        if let Some(tree) = &self.syntax_tree {
            all.extend(tree.diagnostics().iter().cloned());
        }
        for tree in self.import_syntax_trees.iter().flatten() {
            all.extend(tree.diagnostics().iter().cloned());
        }
        all.extend(self.diagnostics.iter().cloned());
        if let Some(tree) = &self.ir_tree {
            all.extend(tree.all_diagnostics().cloned());
        }
        if let Some(output) = &self.generated_output {
            all.extend(output.diagnostics().iter().cloned());
        }
        all
    }
}

impl HasDiagnostics for Document {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn has_errors(&self) -> bool {
        self.all_diagnostics().iter().any(Diagnostic::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slots_are_errors() {
        let mut document = Document::new(SourceDocument::new("a.tag", "<p></p>"));

        assert!(matches!(
            document.require_syntax_tree(PhaseKind::IrLowering),
            Err(Error::MissingDocumentDependency {
                phase: PhaseKind::IrLowering,
                artifact: "syntax tree"
            })
        ));
        assert!(document.require_import_syntax_trees(PhaseKind::IrLowering).is_err());
        assert!(document.require_ir_tree(PhaseKind::Optimization).is_err());
        assert!(document.take_ir_tree(PhaseKind::Optimization).is_err());
    }

    #[test]
    fn test_set_twice_overwrites() {
        let mut document = Document::new(SourceDocument::new("a.tag", ""));
        document.set_generated_output(GeneratedOutput::new("one".into(), Vec::new()));
        document.set_generated_output(GeneratedOutput::new("two".into(), Vec::new()));
        assert_eq!(document.generated_output().map(GeneratedOutput::code), Some("two"));
    }

    #[test]
    fn test_take_and_restore_ir() {
        let mut document = Document::new(SourceDocument::new("a.tag", ""));
        document.set_ir_tree(IrTree::new());

        let tree = document.take_ir_tree(PhaseKind::Optimization).unwrap();
        assert!(document.ir_tree().is_none());
        document.set_ir_tree(tree);
        assert!(document.require_ir_tree(PhaseKind::TargetLowering).is_ok());
    }

    #[test]
    fn test_imports_keep_order() {
        let document = Document::with_imports(
            SourceDocument::new("index.tag", ""),
            vec![
                SourceDocument::new("_Imports.tag", ""),
                SourceDocument::new("Views/_Imports.tag", ""),
            ],
        );
        let paths: Vec<_> = document
            .imports()
            .iter()
            .filter_map(SourceDocument::file_path)
            .collect();
        assert_eq!(paths, vec!["_Imports.tag", "Views/_Imports.tag"]);
    }

    #[test]
    fn test_document_diagnostics() {
        let mut document = Document::new(SourceDocument::new("a.tag", ""));
        assert!(!document.has_errors());
        document.add_diagnostic(crate::diagnostics::factory::duplicate_directive(None, "page"));
        assert!(document.has_errors());
        assert_eq!(document.all_diagnostics().len(), 1);
    }
}
