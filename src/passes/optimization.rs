//! Optimization passes.
//!
//! Both passes are lossy: directive nodes and literal boundaries are gone afterwards.

use crate::{
    document::{Document, SourceSpan},
    engine::{EngineFeature, IrPass, PassContext},
    ir::{CollectingVisitor, IrTree, NodeKind, NodeReference},
    Result,
};

/// Detaches every directive node, moving its diagnostics to the document root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveRemovalPass;

impl EngineFeature for DirectiveRemovalPass {
    fn name(&self) -> &'static str {
        "DirectiveRemovalPass"
    }
}

impl IrPass for DirectiveRemovalPass {
    fn order(&self) -> i32 {
        50
    }

    fn execute(
        &self,
        _context: &PassContext<'_>,
        _document: &mut Document,
        ir: &mut IrTree,
    ) -> Result<()> {
        let mut visitor = CollectingVisitor::new(NodeKind::is_directive);
        ir.walk(&mut visitor);

        let root = ir.root();
        for reference in &visitor.references {
            let diagnostics = ir.node(reference.node)?.diagnostics.clone();
            for diagnostic in diagnostics {
                ir.add_diagnostic(root, diagnostic)?;
            }
        }

        log::debug!("removing {} directive nodes", visitor.references.len());
        ir.remove_all(&visitor.references)
    }
}

/// Merges adjacent literal siblings into one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralMergePass;

fn merged_span(first: Option<SourceSpan>, second: Option<SourceSpan>) -> Option<SourceSpan> {
    match (first, second) {
        (Some(first), Some(second)) if second.end() >= first.absolute_index => {
            Some(SourceSpan::new(
                first.absolute_index,
                first.line_index,
                first.character_index,
                second.end() - first.absolute_index,
            ))
        }
        (first, _) => first,
    }
}

impl EngineFeature for LiteralMergePass {
    fn name(&self) -> &'static str {
        "LiteralMergePass"
    }
}

impl IrPass for LiteralMergePass {
    fn order(&self) -> i32 {
        100
    }

    fn execute(
        &self,
        _context: &PassContext<'_>,
        _document: &mut Document,
        ir: &mut IrTree,
    ) -> Result<()> {
        let parents: Vec<_> = std::iter::once(ir.root())
            .chain(ir.preorder().map(|reference| reference.node))
            .collect();

        let mut merged = Vec::new();
        for parent in parents {
            let mut anchor = None;
            for (position, id) in ir.children(parent).to_vec().into_iter().enumerate() {
                let node = ir.node(id)?;
                let NodeKind::HtmlContent { content } = &node.kind else {
                    anchor = None;
                    continue;
                };

                let Some(target) = anchor else {
                    anchor = Some(id);
                    continue;
                };

                let content = content.clone();
                let span = node.span;
                let diagnostics = node.diagnostics.clone();

                let target = ir.node_mut(target)?;
                if let NodeKind::HtmlContent { content: existing } = &mut target.kind {
                    existing.push_str(&content);
                }
                target.span = merged_span(target.span, span);
                target.diagnostics.extend(diagnostics);
                merged.push(NodeReference {
                    parent,
                    node: id,
                    position,
                });
            }
        }

        log::debug!("merged {} literal nodes", merged.len());
        ir.remove_all(&merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::factory,
        document::SourceDocument,
        engine::{EngineConfig, FeatureIndex, PhaseKind},
        ir::IrNode,
    };

    fn run(pass: &dyn IrPass, ir: &mut IrTree) {
        let config = EngineConfig::default();
        let features = FeatureIndex::default();
        let context = PassContext {
            phase: PhaseKind::Optimization,
            config: &config,
            features: &features,
        };
        let mut document = Document::new(SourceDocument::from_content(""));
        pass.execute(&context, &mut document, ir).unwrap();
    }

    fn html(content: &str) -> IrNode {
        IrNode::new(NodeKind::HtmlContent {
            content: content.to_string(),
        })
    }

    fn directive(name: &str) -> IrNode {
        IrNode::new(NodeKind::Directive {
            name: name.to_string(),
            tokens: Vec::new(),
            imported: false,
        })
    }

    #[test]
    fn test_directive_removal_moves_diagnostics() {
        let mut ir = IrTree::new();
        let root = ir.root();
        let d1 = factory::duplicate_directive(None, "a");
        let d2 = factory::invalid_tag_helper_lookup_text(None, "x");

        ir.add_child(root, directive("a").with_diagnostics(vec![d1.clone()])).unwrap();
        ir.add_child(root, html("<p>")).unwrap();
        let element = ir
            .add_child(
                root,
                IrNode::new(NodeKind::Element {
                    name: "div".to_string(),
                    attributes: Vec::new(),
                    tag_mode: crate::ir::TagMode::StartTagAndEndTag,
                }),
            )
            .unwrap();
        ir.add_child(element, directive("b").with_diagnostics(vec![d2.clone()])).unwrap();
        ir.add_child(root, directive("c")).unwrap();

        run(&DirectiveRemovalPass, &mut ir);

        assert!(!ir
            .preorder()
            .any(|r| ir.get(r.node).is_some_and(|n| n.kind.is_directive())));
        let root_diagnostics = &ir.node(root).unwrap().diagnostics;
        assert!(root_diagnostics.contains(&d1));
        assert!(root_diagnostics.contains(&d2));
        assert_eq!(ir.children(root).len(), 2);
    }

    #[test]
    fn test_literal_merge() {
        let mut ir = IrTree::new();
        let root = ir.root();
        let source = SourceDocument::from_content("abcdef");
        ir.add_child(root, html("ab").with_span(Some(source.span(0, 2)))).unwrap();
        ir.add_child(root, html("cd").with_span(Some(source.span(2, 2)))).unwrap();
        ir.add_child(root, IrNode::new(NodeKind::Expression { code: "x".to_string() }))
            .unwrap();
        ir.add_child(root, html("e")).unwrap();
        ir.add_child(root, html("f")).unwrap();

        run(&LiteralMergePass, &mut ir);

        let contents: Vec<String> = ir
            .children(root)
            .iter()
            .map(|id| match &ir.get(*id).unwrap().kind {
                NodeKind::HtmlContent { content } => content.clone(),
                NodeKind::Expression { code } => format!("@{code}"),
                other => other.label().to_string(),
            })
            .collect();
        assert_eq!(contents, vec!["abcd", "@x", "ef"]);

        let first = ir.get(ir.children(root)[0]).unwrap();
        assert_eq!(first.span.map(|s| s.length), Some(4));
    }
}
