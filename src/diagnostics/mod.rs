//! Content diagnostics produced while compiling a template.
//!
//! Diagnostics describe problems with the *input* (a misplaced directive, an invalid descriptor
//! name, an element that almost matched a tag helper). They never stop compilation: they are
//! attached to whatever they describe and every later phase must tolerate them. Wiring defects
//! in the pipeline itself are reported through [`crate::Error`] instead.
//!
//! # Key Components
//!
//! - [`Diagnostic`] - A single reported problem with a stable identifier
//! - [`Severity`] - Warning or error
//! - [`HasDiagnostics`] - Aggregation over any diagnostic-bearing entity
//! - [`factory`] - Constructors for every diagnostic the core emits
//!
//! # Identifier Ranges
//!
//! | Range | Area |
//! |-------|------|
//! | `TS1xxx` | Markup and directive syntax |
//! | `TS2xxx` | Semantic checks during classification and binding |
//! | `TS3xxx` | Tag descriptor validation |

pub mod factory;

use std::fmt;

use strum::Display;

use crate::document::SourceSpan;

/// Severity of a [`Diagnostic`].
///
/// Only [`Severity::Error`] counts towards [`HasDiagnostics::has_errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Severity {
    /// The input is suspicious but output can still be produced as intended
    Warning,
    /// The input is invalid; output may not reflect the author's intent
    Error,
}

/// Static description of a diagnostic kind: identifier and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticDescriptor {
    /// Stable identifier, e.g. `TS2001`
    pub id: &'static str,
    /// Severity every instance of this descriptor carries
    pub severity: Severity,
}

impl DiagnosticDescriptor {
    /// Create a new descriptor
    #[must_use]
    pub const fn new(id: &'static str, severity: Severity) -> Self {
        DiagnosticDescriptor { id, severity }
    }
}

/// A single problem found in the compiled content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    id: &'static str,
    severity: Severity,
    message: String,
    span: Option<SourceSpan>,
}

impl Diagnostic {
    /// Create a diagnostic from its descriptor and a fully formatted message
    ///
    /// ## Arguments
    /// * `descriptor` - Identifier and severity
    /// * `span` - Location in the source, if known
    /// * `message` - Human readable description
    #[must_use]
    pub fn new(
        descriptor: DiagnosticDescriptor,
        span: Option<SourceSpan>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            id: descriptor.id,
            severity: descriptor.severity,
            message: message.into(),
            span,
        }
    }

    /// The stable identifier
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The severity
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The formatted message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Location in the source, if known
    #[must_use]
    pub fn span(&self) -> Option<&SourceSpan> {
        self.span.as_ref()
    }

    /// Returns `true` for [`Severity::Error`]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Return a copy of this diagnostic located at `span`
    #[must_use]
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(
                f,
                "{} {}: {} ({})",
                self.severity.to_string().to_lowercase(),
                self.id,
                self.message,
                span
            ),
            None => write!(
                f,
                "{} {}: {}",
                self.severity.to_string().to_lowercase(),
                self.id,
                self.message
            ),
        }
    }
}

/// Any entity which carries diagnostics.
pub trait HasDiagnostics {
    /// The diagnostics attached directly to this entity
    fn diagnostics(&self) -> &[Diagnostic];

    /// `true` if any attached diagnostic has [`Severity::Error`]
    fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(Diagnostic::is_error)
    }
}

impl HasDiagnostics for [Diagnostic] {
    fn diagnostics(&self) -> &[Diagnostic] {
        self
    }
}

impl HasDiagnostics for Vec<Diagnostic> {
    fn diagnostics(&self) -> &[Diagnostic] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARN: DiagnosticDescriptor = DiagnosticDescriptor::new("TS9998", Severity::Warning);
    const ERR: DiagnosticDescriptor = DiagnosticDescriptor::new("TS9999", Severity::Error);

    #[test]
    fn test_has_errors_only_counts_errors() {
        let warnings = vec![Diagnostic::new(WARN, None, "careful")];
        assert!(!warnings.has_errors());

        let mixed = vec![
            Diagnostic::new(WARN, None, "careful"),
            Diagnostic::new(ERR, None, "broken"),
        ];
        assert!(mixed.has_errors());
    }

    #[test]
    fn test_empty_has_no_errors() {
        let empty: Vec<Diagnostic> = Vec::new();
        assert!(!empty.has_errors());
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(ERR, None, "broken");
        assert_eq!(diagnostic.to_string(), "error TS9999: broken");

        let located = diagnostic.with_span(SourceSpan::new(4, 1, 2, 3));
        assert_eq!(located.to_string(), "error TS9999: broken (2:3)");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
    }
}
