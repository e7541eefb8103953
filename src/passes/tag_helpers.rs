//! Tag helper directive resolution and element binding.

use std::sync::Arc;

use crate::{
    binding::{BindingResult, ElementQuery, TagHelperBinder},
    descriptors::{find_invalid_character, names_equal, starts_with, TagDescriptor, TagStructure},
    diagnostics::{factory, Diagnostic},
    document::{Document, SourceSpan, TagHelperContext},
    engine::{EngineFeature, IrPass, PassContext},
    ir::{HtmlAttribute, IrTree, NodeId, NodeKind, TagHelperProperty, TagMode},
    passes::directives::{ADD_TAG_HELPER, REMOVE_TAG_HELPER, TAG_HELPER_PREFIX},
    Result,
};

/// A parsed `"pattern, assembly"` lookup
#[derive(Debug, Clone, PartialEq, Eq)]
struct LookupText<'a> {
    pattern: &'a str,
    assembly: &'a str,
}

impl<'a> LookupText<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let (pattern, assembly) = text.split_once(',')?;
        let pattern = pattern.trim();
        let assembly = assembly.trim();
        if pattern.is_empty() || assembly.is_empty() || assembly.contains(',') {
            return None;
        }
        Some(LookupText { pattern, assembly })
    }

    /// Ordinal match on assembly and name; a trailing `*` matches any name suffix
    fn matches(&self, descriptor: &TagDescriptor) -> bool {
        if descriptor.assembly_name() != self.assembly {
            return false;
        }
        match self.pattern.strip_suffix('*') {
            Some(prefix) => descriptor.name().starts_with(prefix),
            None => descriptor.name() == self.pattern,
        }
    }
}

/// Children a restricting parent tag helper accepts
struct Restriction {
    parent: String,
    allowed: Vec<String>,
}

impl Restriction {
    fn from_descriptors(parent: &str, descriptors: &[Arc<TagDescriptor>]) -> Option<Self> {
        let mut allowed: Vec<String> = Vec::new();
        for descriptor in descriptors.iter().filter(|d| d.restricts_children()) {
            for child in descriptor.allowed_child_tags() {
                if !allowed.iter().any(|name| name == child.name()) {
                    allowed.push(child.name().to_string());
                }
            }
        }

        (!allowed.is_empty()).then(|| Restriction {
            parent: parent.to_string(),
            allowed,
        })
    }

    fn allows(&self, child: &str, case_sensitive: bool) -> bool {
        self.allowed
            .iter()
            .any(|name| names_equal(name, child, case_sensitive))
    }

    fn allowed_list(&self) -> String {
        self.allowed.join(", ")
    }
}

/// Children of one element still to be bound, with what applies to them
struct BindScope {
    children: std::vec::IntoIter<NodeId>,
    parent_tag: Option<String>,
    restriction: Option<Restriction>,
}

impl BindScope {
    fn new(
        children: Vec<NodeId>,
        parent_tag: Option<String>,
        restriction: Option<Restriction>,
    ) -> Self {
        BindScope {
            children: children.into_iter(),
            parent_tag,
            restriction,
        }
    }

    fn next_child(&mut self) -> Option<NodeId> {
        self.children.next()
    }
}

/// Resolves `@addTagHelper`, `@removeTagHelper` and `@tagHelperPrefix` against the document's
/// tag helpers and turns every bound element into a tag helper node.
///
/// A tag helper context preset on the document is used as is; otherwise the context
/// resolved from the directives is stored on the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagHelperBinderPass;

impl TagHelperBinderPass {
    /// Compute the context from the directives, reporting malformed ones on their nodes
    fn resolve_context(
        context: &PassContext<'_>,
        document: &Document,
        ir: &mut IrTree,
    ) -> Result<TagHelperContext> {
        let available = document.tag_helpers().unwrap_or_default();
        let mut selected: Vec<Arc<TagDescriptor>> = Vec::new();
        let mut prefix = context.config.default_tag_helper_prefix.clone();

        let directives: Vec<NodeId> = ir
            .preorder()
            .map(|reference| reference.node)
            .filter(|id| ir.get(*id).is_some_and(|node| node.kind.is_directive()))
            .collect();

        for id in directives {
            let node = ir.node(id)?;
            let NodeKind::Directive { name, tokens, .. } = &node.kind else {
                continue;
            };
            let Some(value) = tokens.first() else {
                continue;
            };
            let span = node.span;

            let diagnostic = match name.as_str() {
                ADD_TAG_HELPER | REMOVE_TAG_HELPER => match LookupText::parse(value) {
                    None => Some(factory::invalid_tag_helper_lookup_text(span, value)),
                    Some(lookup) if name == ADD_TAG_HELPER => {
                        for descriptor in available.iter().filter(|d| lookup.matches(d)) {
                            if !selected.contains(descriptor) {
                                selected.push(Arc::clone(descriptor));
                            }
                        }
                        None
                    }
                    Some(lookup) => {
                        selected.retain(|descriptor| !lookup.matches(descriptor));
                        None
                    }
                },
                TAG_HELPER_PREFIX => match find_invalid_character(value) {
                    Some(invalid) => Some(factory::invalid_tag_helper_prefix(span, value, invalid)),
                    None => {
                        prefix = Some(value.clone());
                        None
                    }
                },
                _ => None,
            };

            if let Some(diagnostic) = diagnostic {
                ir.add_diagnostic(id, diagnostic)?;
            }
        }

        log::debug!(
            "resolved {} of {} tag helpers, prefix {:?}",
            selected.len(),
            available.len(),
            prefix
        );
        Ok(TagHelperContext::new(prefix, selected))
    }

    /// Bind every element below `root`, one scope per element whose children are pending
    fn bind_tree(
        binder: &TagHelperBinder,
        ir: &mut IrTree,
        root: NodeId,
        case_sensitive: bool,
    ) -> Result<()> {
        let mut scopes = vec![BindScope::new(ir.children(root).to_vec(), None, None)];

        while let Some(scope) = scopes.last_mut() {
            let Some(child) = scope.next_child() else {
                scopes.pop();
                continue;
            };
            let nested = Self::bind_child(
                binder,
                ir,
                child,
                scope.parent_tag.as_deref(),
                scope.restriction.as_ref(),
                case_sensitive,
            )?;
            if let Some(nested) = nested {
                scopes.push(nested);
            }
        }
        Ok(())
    }

    /// Validate and bind one child; elements yield the scope of their own children
    fn bind_child(
        binder: &TagHelperBinder,
        ir: &mut IrTree,
        child: NodeId,
        parent_tag: Option<&str>,
        restriction: Option<&Restriction>,
        case_sensitive: bool,
    ) -> Result<Option<BindScope>> {
        let node = ir.node(child)?;
        let span = node.span;

        let (name, attributes, tag_mode) = match &node.kind {
            NodeKind::Element {
                name,
                attributes,
                tag_mode,
            } => (name.clone(), attributes.clone(), *tag_mode),
            NodeKind::HtmlContent { content } => {
                if let Some(restriction) = restriction {
                    if !content.trim().is_empty() {
                        let diagnostic = factory::cannot_have_non_tag_content(
                            span,
                            &restriction.parent,
                            &restriction.allowed_list(),
                        );
                        ir.add_diagnostic(child, diagnostic)?;
                    }
                }
                return Ok(None);
            }
            NodeKind::Expression { .. } => {
                if let Some(restriction) = restriction {
                    let diagnostic = factory::cannot_have_non_tag_content(
                        span,
                        &restriction.parent,
                        &restriction.allowed_list(),
                    );
                    ir.add_diagnostic(child, diagnostic)?;
                }
                return Ok(None);
            }
            _ => return Ok(None),
        };

        if let Some(restriction) = restriction {
            let unprefixed = match binder.prefix() {
                Some(prefix) if starts_with(&name, prefix, case_sensitive) => {
                    &name[prefix.len()..]
                }
                _ => name.as_str(),
            };
            if !restriction.allows(unprefixed, case_sensitive) {
                let diagnostic = factory::invalid_nested_tag(
                    span,
                    &name,
                    &restriction.parent,
                    &restriction.allowed_list(),
                );
                ir.add_diagnostic(child, diagnostic)?;
            }
        }

        let query = ElementQuery {
            tag_name: &name,
            parent_tag,
            attributes: attributes
                .iter()
                .map(|attribute| (attribute.name.as_str(), attribute.value.as_deref()))
                .collect(),
            case_sensitive,
            span,
        };

        let mut nested = None;
        if let Some(result) = binder.get_binding(&query) {
            let (rewritten, diagnostics, descriptors) =
                Self::rewrite(result, &name, attributes, tag_mode, span);
            if let Some(kind) = rewritten {
                nested = Restriction::from_descriptors(&name, &descriptors);
                ir.node_mut(child)?.kind = kind;
            }
            for diagnostic in diagnostics {
                ir.add_diagnostic(child, diagnostic)?;
            }
        }

        Ok(Some(BindScope::new(ir.children(child).to_vec(), Some(name), nested)))
    }

    /// Build the tag helper node for a binding, with its validation diagnostics
    fn rewrite(
        result: BindingResult,
        tag_name: &str,
        attributes: Vec<HtmlAttribute>,
        tag_mode: TagMode,
        span: Option<SourceSpan>,
    ) -> (Option<NodeKind>, Vec<Diagnostic>, Vec<Arc<TagDescriptor>>) {
        let (bindings, mut diagnostics) = result.into_parts();
        if bindings.is_empty() {
            return (None, diagnostics, Vec::new());
        }

        // tag structure agreement across every matched rule
        let mut expected: Option<(TagStructure, &str)> = None;
        for binding in &bindings {
            for rule in binding.matched_rules() {
                if rule.tag_structure() == TagStructure::Unspecified {
                    continue;
                }
                match expected {
                    None => {
                        expected =
                            Some((rule.tag_structure(), binding.descriptor().display_name()));
                    }
                    Some((structure, first)) if structure != rule.tag_structure() => {
                        diagnostics.push(factory::inconsistent_tag_structure(
                            span,
                            first,
                            binding.descriptor().display_name(),
                            tag_name,
                        ));
                    }
                    Some(_) => {}
                }
            }
        }
        if matches!(expected, Some((TagStructure::WithoutEndTag, _)))
            && tag_mode == TagMode::StartTagAndEndTag
        {
            diagnostics.push(factory::end_tag_not_allowed(span, tag_name));
        }

        let descriptors: Vec<Arc<TagDescriptor>> =
            bindings.iter().map(|b| Arc::clone(b.descriptor())).collect();
        let mut properties = Vec::new();
        let mut html_attributes = Vec::new();

        for attribute in attributes {
            let mut claimed = false;
            for descriptor in &descriptors {
                let Some(bound) = descriptor.bound_attribute_for(&attribute.name) else {
                    continue;
                };
                claimed = true;

                let is_indexer = !bound.matches_name(&attribute.name);
                if is_indexer
                    && bound
                        .indexer_name_prefix()
                        .is_some_and(|prefix| prefix.len() == attribute.name.len())
                {
                    diagnostics.push(factory::indexer_attribute_missing_key(
                        span,
                        &attribute.name,
                        tag_name,
                    ));
                    continue;
                }

                let type_name = if is_indexer {
                    bound.indexer_type_name().unwrap_or(bound.type_name())
                } else {
                    bound.type_name()
                };
                properties.push(TagHelperProperty {
                    attribute_name: attribute.name.clone(),
                    descriptor_name: descriptor.name().to_string(),
                    bound_attribute: bound.display_name().to_string(),
                    type_name: type_name.to_string(),
                    is_indexer,
                    value: attribute.value.clone(),
                });
            }

            if !claimed {
                html_attributes.push(attribute);
            }
        }

        let kind = NodeKind::TagHelper {
            tag_name: tag_name.to_string(),
            tag_mode,
            descriptors: descriptors.clone(),
            properties,
            html_attributes,
        };
        (Some(kind), diagnostics, descriptors)
    }
}

impl EngineFeature for TagHelperBinderPass {
    fn name(&self) -> &'static str {
        "TagHelperBinderPass"
    }
}

impl IrPass for TagHelperBinderPass {
    fn order(&self) -> i32 {
        100
    }

    fn execute(
        &self,
        context: &PassContext<'_>,
        document: &mut Document,
        ir: &mut IrTree,
    ) -> Result<()> {
        let tag_helper_context = match document.tag_helper_context() {
            Some(preset) => preset.clone(),
            None => {
                let resolved = Self::resolve_context(context, document, ir)?;
                document.set_tag_helper_context(resolved.clone());
                resolved
            }
        };

        if tag_helper_context.descriptors().is_empty() {
            return Ok(());
        }

        let case_sensitive = document
            .parser_options()
            .map_or(context.config.case_sensitive_tags, |o| o.case_sensitive_tags());
        let binder =
            TagHelperBinder::new(tag_helper_context.prefix(), tag_helper_context.descriptors());
        let root = ir.root();
        Self::bind_tree(&binder, ir, root, case_sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_text_parsing() {
        assert_eq!(
            LookupText::parse(" *, Lib "),
            Some(LookupText {
                pattern: "*",
                assembly: "Lib"
            })
        );
        assert!(LookupText::parse("Lib").is_none());
        assert!(LookupText::parse(", Lib").is_none());
        assert!(LookupText::parse("a, b, c").is_none());
    }
}
