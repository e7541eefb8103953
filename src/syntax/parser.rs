//! The markup parser.
//!
//! [`MarkupParser`] understands just enough template syntax to drive the pipeline:
//!
//! - elements with quoted, unquoted and minimized attributes, self-closing tags and the HTML
//!   void elements (`<input>`, `<br>`, ...)
//! - comments (`<!-- ... -->`), kept as literal text
//! - `@name` and `@a.b.c` expressions, with `@@` as an escaped `@`
//! - `@directive tokens` lines, for directives registered in the [`ParserOptions`] only
//!
//! Malformed markup never fails the parse; it produces `TS1xxx` diagnostics on the tree.

use std::sync::Arc;

use crate::{
    diagnostics::{factory, Diagnostic},
    document::SourceDocument,
    engine::{DirectiveDescriptor, DirectiveTokenKind, EngineFeature, ParserOptions},
    ir::TagMode,
    syntax::{cursor::Cursor, AttributeSyntax, ElementSyntax, SyntaxNode, SyntaxTree},
};

/// Elements which never have content or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Turns source text into a [`SyntaxTree`].
pub trait SyntaxParser: EngineFeature {
    /// Parse `source` with `options`
    fn parse(&self, source: &SourceDocument, options: &Arc<ParserOptions>) -> SyntaxTree;
}

/// Reference markup parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupParser;

impl MarkupParser {
    /// Create a new parser
    #[must_use]
    pub fn new() -> Self {
        MarkupParser
    }
}

impl EngineFeature for MarkupParser {
    fn name(&self) -> &'static str {
        "MarkupParser"
    }
}

impl SyntaxParser for MarkupParser {
    fn parse(&self, source: &SourceDocument, options: &Arc<ParserOptions>) -> SyntaxTree {
        let mut state = ParseState::new(source, options);
        state.run();

        SyntaxTree::new(
            source.file_path().map(str::to_string),
            state.root,
            state.diagnostics,
            options.clone(),
        )
    }
}

/// An element whose end tag has not been seen yet
struct OpenElement {
    element: ElementSyntax,
}

struct ParseState<'a> {
    source: &'a SourceDocument,
    options: &'a ParserOptions,
    cursor: Cursor<'a>,
    /// Start of literal text not yet emitted
    text_start: usize,
    root: Vec<SyntaxNode>,
    open: Vec<OpenElement>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a SourceDocument, options: &'a ParserOptions) -> Self {
        ParseState {
            source,
            options,
            cursor: Cursor::new(source.content()),
            text_start: 0,
            root: Vec::new(),
            open: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(current) = self.cursor.peek() {
            match current {
                '@' => self.parse_transition(),
                '<' if self.cursor.starts_with("<!--") => self.skip_comment(),
                '<' if self.cursor.peek_second() == Some('/') => self.parse_end_tag(),
                '<' if self.cursor.peek_second().is_some_and(is_name_start) => {
                    self.parse_start_tag();
                }
                _ => self.cursor.advance(),
            }
        }

        self.flush_text(self.cursor.pos());
        while let Some(open) = self.open.pop() {
            self.diagnostics
                .push(factory::missing_end_tag(open.element.span, &open.element.name));
            let mut element = open.element;
            element.tag_mode = TagMode::StartTagOnly;
            self.push(SyntaxNode::Element(element));
        }
    }

    /// Add a finished node to the innermost open element, or the root
    fn push(&mut self, node: SyntaxNode) {
        match self.open.last_mut() {
            Some(open) => open.element.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Emit pending literal text ending at `end`
    fn flush_text(&mut self, end: usize) {
        if end > self.text_start {
            let content = self.cursor.slice(self.text_start, end).to_string();
            let span = self.source.span(self.text_start, end - self.text_start);
            self.push(SyntaxNode::Text { content, span });
        }
        self.text_start = end;
    }

    fn skip_comment(&mut self) {
        match self.cursor.rest().find("-->") {
            Some(end) => self.cursor.advance_by(end + 3),
            None => self.cursor.advance_by(self.cursor.rest().len()),
        }
    }

    /// Handle `@`: escape, directive, expression or literal
    fn parse_transition(&mut self) {
        let start = self.cursor.pos();

        if self.cursor.peek_second() == Some('@') {
            self.flush_text(start);
            // The escape emits one literal '@'
            self.push(SyntaxNode::Text {
                content: "@".to_string(),
                span: self.source.span(start, 2),
            });
            self.cursor.advance_by(2);
            self.text_start = self.cursor.pos();
            return;
        }

        if !self.cursor.peek_second().is_some_and(is_identifier_start) {
            self.cursor.advance();
            return;
        }

        let at_line_start = self.cursor.at_line_start();
        self.cursor.advance();
        let name = self.cursor.read_while(is_identifier_part);

        if at_line_start {
            if let Some(directive) = self.options.directive(name).cloned() {
                self.flush_text(start);
                self.parse_directive(start, &directive);
                return;
            }
        }

        self.flush_text(start);
        while self.cursor.peek() == Some('.')
            && self.cursor.peek_second().is_some_and(is_identifier_start)
        {
            self.cursor.advance();
            self.cursor.read_while(is_identifier_part);
        }
        let end = self.cursor.pos();
        self.push(SyntaxNode::Expression {
            code: self.cursor.slice(start + 1, end).to_string(),
            span: self.source.span(start, end - start),
        });
        self.text_start = end;
    }

    fn parse_directive(&mut self, start: usize, directive: &DirectiveDescriptor) {
        let line = self.cursor.rest();
        let line_length = line.find('\n').unwrap_or(line.len());
        let mut remaining = line[..line_length].trim();
        let mut tokens = Vec::with_capacity(directive.tokens.len());
        let mut missing = false;

        for token in &directive.tokens {
            match token {
                DirectiveTokenKind::Member => {
                    let word_end = remaining
                        .find(char::is_whitespace)
                        .unwrap_or(remaining.len());
                    let word = &remaining[..word_end];
                    missing |= word.is_empty();
                    tokens.push(word.to_string());
                    remaining = remaining[word_end..].trim_start();
                }
                DirectiveTokenKind::String => {
                    let value = strip_quotes(remaining);
                    missing |= value.is_empty();
                    tokens.push(value.to_string());
                    remaining = "";
                }
            }
        }

        let end = self.cursor.pos() + line_length;
        let span = self.source.span(start, end - start);
        if missing {
            self.diagnostics
                .push(factory::directive_must_have_value(span, &directive.name));
        }

        self.push(SyntaxNode::Directive {
            name: directive.name.clone(),
            tokens: tokens.into_iter().filter(|token| !token.is_empty()).collect(),
            span,
        });

        // The line break belongs to the directive
        self.cursor.seek(end);
        if self.cursor.peek() == Some('\n') {
            self.cursor.advance();
        }
        self.text_start = self.cursor.pos();
    }

    fn parse_start_tag(&mut self) {
        let start = self.cursor.pos();
        self.flush_text(start);
        self.cursor.advance();
        let name = self.cursor.read_while(is_name_part).to_string();
        let mut attributes = Vec::new();

        let tag_mode = loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => {
                    let span = self.source.span(start, self.cursor.pos() - start);
                    self.diagnostics.push(factory::unterminated_tag(span, &name));
                    break TagMode::StartTagOnly;
                }
                Some('/') if self.cursor.peek_second() == Some('>') => {
                    self.cursor.advance_by(2);
                    break TagMode::SelfClosing;
                }
                Some('>') => {
                    self.cursor.advance();
                    break if self.is_void(&name) {
                        TagMode::StartTagOnly
                    } else {
                        TagMode::StartTagAndEndTag
                    };
                }
                Some(_) => {
                    if let Some(attribute) = self.parse_attribute() {
                        attributes.push(attribute);
                    }
                }
            }
        };

        let element = ElementSyntax {
            name,
            attributes,
            children: Vec::new(),
            tag_mode,
            span: self.source.span(start, self.cursor.pos() - start),
        };
        self.text_start = self.cursor.pos();

        if tag_mode == TagMode::StartTagAndEndTag {
            self.open.push(OpenElement { element });
        } else {
            self.push(SyntaxNode::Element(element));
        }
    }

    fn parse_attribute(&mut self) -> Option<AttributeSyntax> {
        let start = self.cursor.pos();
        let name = self
            .cursor
            .read_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            .to_string();
        if name.is_empty() {
            // Stray character such as a lone '/' or quote
            self.cursor.advance();
            return None;
        }

        let before_value = self.cursor.pos();
        self.cursor.skip_whitespace();
        if self.cursor.peek() != Some('=') {
            self.cursor.seek(before_value);
            return Some(AttributeSyntax {
                name,
                value: None,
                span: self.source.span(start, before_value - start),
            });
        }

        self.cursor.advance();
        self.cursor.skip_whitespace();
        let value = match self.cursor.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.cursor.advance();
                let rest = self.cursor.rest();
                match rest.find(quote) {
                    Some(length) => {
                        let value = rest[..length].to_string();
                        self.cursor.advance_by(length + 1);
                        value
                    }
                    None => {
                        let span = self.source.span(start, self.cursor.pos() - start);
                        self.diagnostics
                            .push(factory::unterminated_attribute_value(span, &name));
                        self.cursor.advance_by(rest.len());
                        rest.to_string()
                    }
                }
            }
            _ => self
                .cursor
                .read_while(|c| !c.is_whitespace() && c != '>')
                .to_string(),
        };

        Some(AttributeSyntax {
            name,
            value: Some(value),
            span: self.source.span(start, self.cursor.pos() - start),
        })
    }

    fn parse_end_tag(&mut self) {
        let start = self.cursor.pos();
        self.cursor.advance_by(2);
        let name = self.cursor.read_while(is_name_part).to_string();
        match self.cursor.rest().find('>') {
            Some(offset) => self.cursor.advance_by(offset + 1),
            None => {
                let span = self.source.span(start, self.cursor.pos() - start);
                self.diagnostics.push(factory::unterminated_tag(span, &name));
                self.cursor.advance_by(self.cursor.rest().len());
            }
        }
        let end = self.cursor.pos();

        let matching = self
            .open
            .iter()
            .rposition(|open| self.options.tag_names_equal(&open.element.name, &name));

        let Some(index) = matching else {
            // Keep the stray end tag as literal text
            self.diagnostics.push(factory::unexpected_end_tag(
                self.source.span(start, end - start),
                &name,
            ));
            return;
        };

        self.flush_text(start);
        while self.open.len() > index + 1 {
            if let Some(unclosed) = self.open.pop() {
                self.diagnostics.push(factory::missing_end_tag(
                    unclosed.element.span,
                    &unclosed.element.name,
                ));
                let mut element = unclosed.element;
                element.tag_mode = TagMode::StartTagOnly;
                self.push(SyntaxNode::Element(element));
            }
        }

        if let Some(closed) = self.open.pop() {
            self.push(SyntaxNode::Element(closed.element));
        }
        self.text_start = end;
    }

    fn is_void(&self, name: &str) -> bool {
        VOID_ELEMENTS
            .iter()
            .any(|void| void.eq_ignore_ascii_case(name))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_name_part(c: char) -> bool {
    !c.is_whitespace() && c != '>' && c != '/' && c != '<'
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::HasDiagnostics,
        engine::{DirectiveUsage, EngineConfig, ParserOptionsBuilder},
    };

    fn options() -> Arc<ParserOptions> {
        let mut builder = ParserOptionsBuilder::new(&EngineConfig::default());
        builder
            .add_directive(DirectiveDescriptor::single_line(
                "addTagHelper",
                DirectiveUsage::FileScopedMultipleOccurring,
                vec![DirectiveTokenKind::String],
            ))
            .add_directive(DirectiveDescriptor::single_line(
                "model",
                DirectiveUsage::FileScopedSinglyOccurring,
                vec![DirectiveTokenKind::Member],
            ));
        builder.build()
    }

    fn parse(text: &str) -> SyntaxTree {
        MarkupParser::new().parse(&SourceDocument::new("test.tag", text), &options())
    }

    fn element(node: &SyntaxNode) -> &ElementSyntax {
        match node {
            SyntaxNode::Element(element) => element,
            other => panic!("expected element, found {other:?}"),
        }
    }

    #[test]
    fn test_text_and_elements() {
        let tree = parse("hi <p class=\"a\">x</p>");
        assert!(!tree.has_errors());
        assert_eq!(tree.nodes().len(), 2);

        let p = element(&tree.nodes()[1]);
        assert_eq!(p.name, "p");
        assert_eq!(p.tag_mode, TagMode::StartTagAndEndTag);
        assert_eq!(p.attributes[0].name, "class");
        assert_eq!(p.attributes[0].value.as_deref(), Some("a"));
        assert_eq!(
            p.children,
            vec![SyntaxNode::Text {
                content: "x".into(),
                span: p.children[0].span()
            }]
        );
    }

    #[test]
    fn test_attribute_forms() {
        let tree = parse("<input type=text disabled value='v' />");
        let input = element(&tree.nodes()[0]);
        assert_eq!(input.tag_mode, TagMode::SelfClosing);

        let attributes: Vec<_> = input
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            attributes,
            vec![("type", Some("text")), ("disabled", None), ("value", Some("v"))]
        );
    }

    #[test]
    fn test_void_elements() {
        let tree = parse("<div><input type=\"text\"><br></div>");
        assert!(!tree.has_errors());
        let div = element(&tree.nodes()[0]);
        assert_eq!(div.children.len(), 2);
        assert_eq!(element(&div.children[0]).tag_mode, TagMode::StartTagOnly);
    }

    #[test]
    fn test_expressions_and_escape() {
        let tree = parse("a @Model.Name b @@ c @ d");
        let kinds: Vec<_> = tree
            .nodes()
            .iter()
            .map(|node| match node {
                SyntaxNode::Text { content, .. } => format!("T({content})"),
                SyntaxNode::Expression { code, .. } => format!("E({code})"),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["T(a )", "E(Model.Name)", "T( b )", "T(@)", "T( c @ d)"]
        );
    }

    #[test]
    fn test_directives() {
        let tree = parse("@addTagHelper \"*, TestAssembly\"\n@model Foo\n<p>@addTagHelper</p>");
        assert!(!tree.has_errors());

        let directives = tree.directives();
        assert_eq!(directives.len(), 2);
        match directives[0] {
            SyntaxNode::Directive { name, tokens, .. } => {
                assert_eq!(name, "addTagHelper");
                assert_eq!(tokens, &vec!["*, TestAssembly".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }

        // Not at line start: an expression
        let p = element(&tree.nodes()[2]);
        assert!(matches!(p.children[0], SyntaxNode::Expression { .. }));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let text = format!(
            "{}@model Foo\n{}",
            "<div>\n".repeat(depth),
            "</div>".repeat(depth)
        );
        let tree = parse(&text);
        assert!(!tree.has_errors());
        assert_eq!(tree.directives().len(), 1);

        let mut current = element(&tree.nodes()[0]);
        let mut levels = 1;
        while let Some(SyntaxNode::Element(child)) = current.children.get(1) {
            current = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn test_unregistered_directive_is_expression() {
        let tree = parse("@page\n");
        assert!(matches!(tree.nodes()[0], SyntaxNode::Expression { .. }));
    }

    #[test]
    fn test_directive_without_value() {
        let tree = parse("@addTagHelper\n");
        assert_eq!(tree.diagnostics()[0].id(), "TS1003");
    }

    #[test]
    fn test_missing_and_unexpected_end_tags() {
        let tree = parse("<div><span>x</div></p>");
        let ids: Vec<_> = tree.diagnostics().iter().map(Diagnostic::id).collect();
        assert_eq!(ids, vec!["TS1001", "TS1002"]);

        let div = element(&tree.nodes()[0]);
        assert_eq!(div.tag_mode, TagMode::StartTagAndEndTag);
        assert_eq!(element(&div.children[0]).tag_mode, TagMode::StartTagOnly);
    }

    #[test]
    fn test_unclosed_at_end_of_input() {
        let tree = parse("<section><p>text");
        assert_eq!(tree.diagnostics().len(), 2);
        assert!(tree.diagnostics().iter().all(|d| d.id() == "TS1001"));
    }

    #[test]
    fn test_unterminated_start_tag_and_value() {
        let tree = parse("<a href=\"x");
        let ids: Vec<_> = tree.diagnostics().iter().map(Diagnostic::id).collect();
        assert_eq!(ids, vec!["TS1004", "TS1000"]);
    }

    #[test]
    fn test_comments_are_text() {
        let tree = parse("<!-- <p> -->");
        assert!(!tree.has_errors());
        assert!(matches!(tree.nodes()[0], SyntaxNode::Text { .. }));
    }

    #[test]
    fn test_end_tag_case_insensitive_by_default() {
        let tree = parse("<DIV></div>");
        assert!(!tree.has_errors());
    }
}
