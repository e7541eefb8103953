//! End-to-end tests for the default compilation pipeline.
//!
//! Every test builds a document from template source, runs it through an engine and inspects
//! the generated render instructions, the intermediate tree and the collected diagnostics.

use std::sync::Arc;

use tagscope::{
    engine::{DirectiveDescriptor, DirectiveUsage},
    prelude::*,
};

fn text_input() -> Arc<TagDescriptor> {
    Arc::new(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "TextInput", "Forms")
            .tag_matching_rule(|rule| rule.tag_name("input"))
            .bound_attribute(|attribute| attribute.name("value").type_name("System.String"))
            .build(),
    )
}

fn compile(document: &mut Document) -> Result<String> {
    Engine::create()?.process(document)?;
    Ok(document
        .generated_output()
        .map(|output| output.code().to_string())
        .unwrap_or_default())
}

fn ids(document: &Document) -> Vec<&'static str> {
    document.all_diagnostics().iter().map(Diagnostic::id).collect()
}

#[test]
fn test_plain_markup() -> Result<()> {
    let mut document = Document::new(SourceDocument::new("index.tag", "<p>Hello @Name</p>"));
    let code = compile(&mut document)?;

    assert!(code.starts_with("#pragma checksum \"index.tag\""));
    assert!(code.contains("// kind: default\n"));
    assert!(code.contains(
        "WriteLiteral(\"<p>\")\nWriteLiteral(\"Hello \")\nWriteExpression(Name)\nWriteLiteral(\"</p>\")\n"
    ));
    assert!(!document.has_errors());
    Ok(())
}

#[test]
fn test_add_tag_helper_binds_elements() -> Result<()> {
    let source = "@addTagHelper *, Forms\n<input value=\"x\" class=\"wide\" />";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![text_input()]);
    let code = compile(&mut document)?;

    assert!(code.contains(
        "StartTagHelper(\"input\", SelfClosing)\n    CreateTagHelper(Forms.TextInput)\n    SetProperty(TextInput.value, \"x\")\n    AddHtmlAttribute(\"class\", \"wide\")\nEndTagHelper(\"input\")\n"
    ));
    assert!(!code.contains("@addTagHelper"));
    assert!(!document.has_errors());

    let context = document.tag_helper_context().expect("context is resolved");
    assert_eq!(context.descriptors().len(), 1);
    assert_eq!(context.prefix(), None);
    Ok(())
}

#[test]
fn test_unselected_tag_helpers_do_not_bind() -> Result<()> {
    let mut document = Document::new(SourceDocument::from_content("<input value=\"x\" />"));
    document.set_tag_helpers(vec![text_input()]);
    let code = compile(&mut document)?;

    assert!(!code.contains("StartTagHelper"));
    assert!(code.contains("WriteLiteral(\"<input value=\\\"x\\\" />\")"));
    Ok(())
}

#[test]
fn test_remove_tag_helper() -> Result<()> {
    let source = "@addTagHelper *, Forms\n@removeTagHelper TextInput, Forms\n<input />";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![text_input()]);
    let code = compile(&mut document)?;

    assert!(!code.contains("StartTagHelper"));
    assert!(document
        .tag_helper_context()
        .is_some_and(|context| context.descriptors().is_empty()));
    Ok(())
}

#[test]
fn test_prefix_limits_binding() -> Result<()> {
    let source = "@tagHelperPrefix th:\n@addTagHelper *, Forms\n<input /><th:input value=\"y\" />";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![text_input()]);
    let code = compile(&mut document)?;

    assert!(code.contains("WriteLiteral(\"<input />\")"));
    assert!(code.contains("StartTagHelper(\"th:input\", SelfClosing)"));
    assert_eq!(code.matches("StartTagHelper").count(), 1);
    assert_eq!(
        document.tag_helper_context().and_then(|c| c.prefix()),
        Some("th:")
    );
    Ok(())
}

#[test]
fn test_imported_directives_apply() -> Result<()> {
    let import = SourceDocument::new("_imports.tag", "@addTagHelper *, Forms\n");
    let mut document = Document::with_imports(
        SourceDocument::new("index.tag", "<input />"),
        vec![import],
    );
    document.set_tag_helpers(vec![text_input()]);
    let code = compile(&mut document)?;

    assert!(code.contains("StartTagHelper(\"input\", SelfClosing)"));
    Ok(())
}

#[test]
fn test_malformed_directives_are_diagnostics() -> Result<()> {
    let source = "@addTagHelper Forms\n@tagHelperPrefix th!\n<p></p>";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![text_input()]);
    compile(&mut document)?;

    let ids = ids(&document);
    assert!(ids.contains(&"TS1005"));
    assert!(ids.contains(&"TS1006"));
    assert!(document.has_errors());

    // directive nodes are gone; their diagnostics moved to the root
    let ir = document.ir_tree().expect("intermediate tree");
    assert!(!ir
        .preorder()
        .any(|r| ir.get(r.node).is_some_and(|n| n.kind.is_directive())));
    assert_eq!(ir.node(ir.root())?.diagnostics.len(), 2);
    Ok(())
}

#[test]
fn test_page_classification() -> Result<()> {
    let mut page = Document::new(SourceDocument::from_content("@page\n<p></p>"));
    let code = compile(&mut page)?;
    assert_eq!(page.ir_tree().and_then(|ir| ir.document_kind()), Some("page"));
    assert!(code.contains("// kind: page"));

    let mut plain = Document::new(SourceDocument::from_content("<p></p>"));
    compile(&mut plain)?;
    assert_eq!(plain.ir_tree().and_then(|ir| ir.document_kind()), Some("default"));
    Ok(())
}

#[test]
fn test_imported_page_directive_does_not_make_a_page() -> Result<()> {
    let mut document = Document::with_imports(
        SourceDocument::from_content("<p></p>"),
        vec![SourceDocument::from_content("@page\n")],
    );
    compile(&mut document)?;
    assert_eq!(
        document.ir_tree().and_then(|ir| ir.document_kind()),
        Some("default")
    );
    Ok(())
}

#[test]
fn test_duplicate_singly_occurring_directive() -> Result<()> {
    let mut document = Document::new(SourceDocument::from_content("@page\n@page\n"));
    compile(&mut document)?;
    assert_eq!(
        ids(&document).iter().filter(|id| **id == "TS2000").count(),
        1
    );
    Ok(())
}

#[test]
fn test_restricted_children() -> Result<()> {
    let list = Arc::new(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "List", "Lists")
            .tag_matching_rule(|rule| rule.tag_name("ul"))
            .allowed_child_tag(|child| child.name("li"))
            .build(),
    );
    let source = "@addTagHelper *, Lists\n<ul><li>a</li>text<p></p></ul>";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![list]);
    compile(&mut document)?;

    let ids = ids(&document);
    assert!(ids.contains(&"TS2001"));
    assert!(ids.contains(&"TS2002"));
    assert_eq!(ids.len(), 2);
    Ok(())
}

#[test]
fn test_required_attribute_warning() -> Result<()> {
    let typed = Arc::new(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "TextInput", "Forms")
            .tag_matching_rule(|rule| {
                rule.tag_name("input")
                    .require_attribute(|attribute| attribute.name("type").value("text"))
            })
            .build(),
    );
    let source = "@addTagHelper *, Forms\n<input type=\"password\" />";
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![typed]);
    let code = compile(&mut document)?;

    assert!(!code.contains("StartTagHelper"));
    let diagnostics = document.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Warning);
    assert!(!document.has_errors());
    Ok(())
}

#[test]
fn test_literals_are_merged() -> Result<()> {
    let mut document = Document::new(SourceDocument::from_content("a @@ b"));
    let code = compile(&mut document)?;
    assert!(code.contains("WriteLiteral(\"a @ b\")"));
    Ok(())
}

#[test]
fn test_deeply_nested_markup() -> Result<()> {
    const DEPTH: usize = 10_000;

    let badge = Arc::new(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "Badge", "Widgets")
            .tag_matching_rule(|rule| rule.tag_name("span"))
            .build(),
    );
    let source = format!(
        "@addTagHelper *, Widgets\n{}<span>@Value</span>{}",
        "<div>".repeat(DEPTH),
        "</div>".repeat(DEPTH)
    );
    let mut document = Document::new(SourceDocument::from_content(source));
    document.set_tag_helpers(vec![badge]);
    let code = compile(&mut document)?;

    assert!(!document.has_errors());
    assert_eq!(code.matches("WriteLiteral(\"<div>\")").count(), DEPTH);
    assert_eq!(code.matches("WriteLiteral(\"</div>\")").count(), DEPTH);
    assert!(code.contains(
        "    CreateTagHelper(Widgets.Badge)\n    WriteExpression(Value)\nEndTagHelper(\"span\")\n"
    ));
    assert!(code.ends_with("WriteLiteral(\"</div>\")\n"));
    Ok(())
}

#[test]
fn test_batch_keeps_input_order() -> Result<()> {
    let engine = Engine::create()?;
    let documents: Vec<Document> = (0..16)
        .map(|i| {
            Document::new(SourceDocument::new(
                format!("{i}.tag"),
                format!("<p>@Value{i}</p>"),
            ))
        })
        .collect();

    let results = engine.process_batch(documents);
    assert_eq!(results.len(), 16);
    for (i, (document, result)) in results.iter().enumerate() {
        assert!(result.is_ok());
        assert_eq!(document.source().file_path(), Some(format!("{i}.tag").as_str()));
        let code = document.generated_output().map(|o| o.code()).unwrap_or_default();
        assert!(code.contains(&format!("WriteExpression(Value{i})")));
    }
    Ok(())
}

struct ModelDirective;

impl EngineFeature for ModelDirective {
    fn name(&self) -> &'static str {
        "ModelDirective"
    }
}

impl ConfigureParserOptions for ModelDirective {
    fn configure(&self, builder: &mut ParserOptionsBuilder) {
        builder.add_directive(DirectiveDescriptor::single_line(
            "model",
            DirectiveUsage::FileScopedSinglyOccurring,
            vec![DirectiveTokenKind::Member],
        ));
    }
}

struct ModelExtension;

impl Extension for ModelExtension {
    fn name(&self) -> &'static str {
        "ModelExtension"
    }

    fn register(&self, builder: &mut EngineBuilder) {
        builder.add_feature(Feature::parser_options(ModelDirective));
    }
}

#[test]
fn test_extension_registers_directive() -> Result<()> {
    let source = "@model Person\n<p>@Name</p>";

    let mut plain = Document::new(SourceDocument::from_content(source));
    let code = compile(&mut plain)?;
    assert!(code.contains("WriteExpression(model)"));

    let engine = Engine::create_with(|builder| {
        builder.add_extension(&ModelExtension);
    })?;
    assert!(engine.feature_index().contains("ModelDirective"));

    let mut extended = Document::new(SourceDocument::from_content(source));
    engine.process(&mut extended)?;
    assert_eq!(
        extended.syntax_tree().map(|tree| tree.directives().len()),
        Some(1)
    );
    let code = extended.generated_output().map(|o| o.code()).unwrap_or_default();
    assert!(!code.contains("model"));
    assert!(code.contains("WriteExpression(Name)"));
    Ok(())
}

#[test]
fn test_design_time_configuration() -> Result<()> {
    let engine = Engine::create_with(|builder| {
        builder.with_config(EngineConfig::design_time());
    })?;
    let mut document = Document::new(SourceDocument::new("index.tag", "<p></p>"));
    engine.process(&mut document)?;

    let code = document.generated_output().map(|o| o.code()).unwrap_or_default();
    assert!(code.starts_with("// design-time\n"));
    assert!(!code.contains("#pragma checksum"));
    assert!(document
        .ir_tree()
        .is_some_and(|ir| ir.children(ir.root()).iter().all(|id| {
            !matches!(ir.get(*id).map(|n| &n.kind), Some(NodeKind::Directive { .. }))
        })));
    Ok(())
}
