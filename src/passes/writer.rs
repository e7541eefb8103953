//! Reference target writer.
//!
//! [`RenderTargetWriter`] lowers the intermediate tree into a flat list of render
//! instructions, one per line, indented by nesting depth:
//!
//! ```text
//! #pragma checksum "index.tag" "{ff1816ec-aa5e-4d10-87f7-6f4963833460}" "2ef7bde6..."
//! // kind: default
//! WriteLiteral("<p>")
//! WriteExpression(Name)
//! StartTagHelper("th:input", StartTagOnly)
//!     CreateTagHelper(Forms.TextInput)
//!     SetProperty(TextInput.Value, "x")
//!     AddHtmlAttribute("class", "wide")
//! EndTagHelper("th:input")
//! WriteLiteral("</p>")
//! ```

use std::fmt::Write;

use crate::{
    document::{Document, GeneratedOutput},
    engine::{CodeGenerationOptions, EngineFeature, PassContext, TargetWriter},
    ir::{HtmlAttribute, IrTree, NodeId, NodeKind, TagMode},
    utils::bytes_to_hex,
    Result,
};

/// Renders the intermediate tree as render instructions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderTargetWriter;

/// Output buffer tracking indentation
struct CodeWriter<'o> {
    options: &'o CodeGenerationOptions,
    output: String,
    depth: usize,
}

impl CodeWriter<'_> {
    fn line(&mut self, text: &str) {
        self.output.push_str(&self.options.indent(self.depth));
        self.output.push_str(text);
        self.output.push('\n');
    }
}

/// Pending work of the tree walk
enum Step {
    /// Write a node, then its children
    Enter(NodeId),
    /// Write the closing line of a node whose children are done
    Leave { line: String, outdent: bool },
}

fn attribute_literal(attribute: &HtmlAttribute) -> String {
    match &attribute.value {
        Some(value) => format!(" {}=\"{}\"", attribute.name, value),
        None => format!(" {}", attribute.name),
    }
}

impl RenderTargetWriter {
    fn write_checksum(
        document: &Document,
        options: &CodeGenerationOptions,
        writer: &mut CodeWriter<'_>,
    ) {
        if options.suppress_checksum() {
            return;
        }
        let source = document.source();
        let Some(path) = source.file_path() else {
            return;
        };

        let algorithm = options.checksum_algorithm();
        let hex = if source.checksum_algorithm() == algorithm {
            source.checksum_hex()
        } else {
            bytes_to_hex(&algorithm.compute(source.content().as_bytes()))
        };
        writer.line(&format!(
            "#pragma checksum {path:?} \"{}\" \"{hex}\"",
            algorithm.guid()
        ));
    }

    /// Write the subtree under `start` in pre-order, closing lines once its children are done
    fn write_tree(ir: &IrTree, start: NodeId, writer: &mut CodeWriter<'_>) -> Result<()> {
        let mut pending = vec![Step::Enter(start)];

        while let Some(step) = pending.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Leave { line, outdent } => {
                    if outdent {
                        writer.depth -= 1;
                    }
                    writer.line(&line);
                    continue;
                }
            };

            match &ir.node(id)?.kind {
                NodeKind::Document { .. } => {}
                NodeKind::Directive { name, tokens, .. } => {
                    let mut line = format!("// @{name}");
                    for token in tokens {
                        let _ = write!(line, " {token}");
                    }
                    writer.line(&line);
                }
                NodeKind::HtmlContent { content } => {
                    writer.line(&format!("WriteLiteral({content:?})"));
                }
                NodeKind::Expression { code } => {
                    writer.line(&format!("WriteExpression({code})"));
                }
                NodeKind::Element {
                    name,
                    attributes,
                    tag_mode,
                } => {
                    let attributes: String = attributes.iter().map(attribute_literal).collect();
                    let start = match tag_mode {
                        TagMode::SelfClosing => format!("<{name}{attributes} />"),
                        TagMode::StartTagAndEndTag | TagMode::StartTagOnly => {
                            format!("<{name}{attributes}>")
                        }
                    };
                    writer.line(&format!("WriteLiteral({start:?})"));
                    if *tag_mode == TagMode::StartTagAndEndTag {
                        pending.push(Step::Leave {
                            line: format!("WriteLiteral({:?})", format!("</{name}>")),
                            outdent: false,
                        });
                    }
                }
                NodeKind::TagHelper {
                    tag_name,
                    tag_mode,
                    descriptors,
                    properties,
                    html_attributes,
                } => {
                    writer.line(&format!("StartTagHelper({tag_name:?}, {tag_mode})"));
                    writer.depth += 1;
                    for descriptor in descriptors {
                        writer.line(&format!(
                            "CreateTagHelper({}.{})",
                            descriptor.assembly_name(),
                            descriptor.name()
                        ));
                    }
                    for property in properties {
                        let value = property.value.as_deref().unwrap_or_default();
                        writer.line(&format!(
                            "SetProperty({}.{}, {value:?})",
                            property.descriptor_name, property.attribute_name
                        ));
                    }
                    for attribute in html_attributes {
                        match &attribute.value {
                            Some(value) => writer.line(&format!(
                                "AddHtmlAttribute({:?}, {value:?})",
                                attribute.name
                            )),
                            None => {
                                writer.line(&format!("AddHtmlAttribute({:?})", attribute.name));
                            }
                        }
                    }
                    pending.push(Step::Leave {
                        line: format!("EndTagHelper({tag_name:?})"),
                        outdent: true,
                    });
                }
            }

            pending.extend(ir.children(id).iter().rev().map(|child| Step::Enter(*child)));
        }
        Ok(())
    }
}

impl EngineFeature for RenderTargetWriter {
    fn name(&self) -> &'static str {
        "RenderTargetWriter"
    }
}

impl TargetWriter for RenderTargetWriter {
    fn write(
        &self,
        _context: &PassContext<'_>,
        document: &Document,
        ir: &IrTree,
        options: &CodeGenerationOptions,
    ) -> Result<GeneratedOutput> {
        let mut writer = CodeWriter {
            options,
            output: String::new(),
            depth: 0,
        };

        Self::write_checksum(document, options, &mut writer);
        if options.design_time() {
            writer.line("// design-time");
        }
        if let Some(kind) = ir.document_kind() {
            writer.line(&format!("// kind: {kind}"));
        }
        Self::write_tree(ir, ir.root(), &mut writer)?;

        Ok(GeneratedOutput::new(writer.output, Vec::new()))
    }
}
