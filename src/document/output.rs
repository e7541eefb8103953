use crate::diagnostics::{Diagnostic, HasDiagnostics};

/// Target code produced by the last pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedOutput {
    code: String,
    diagnostics: Vec<Diagnostic>,
}

impl GeneratedOutput {
    /// Create output from generated code and the diagnostics gathered while writing it
    #[must_use]
    pub fn new(code: String, diagnostics: Vec<Diagnostic>) -> Self {
        GeneratedOutput { code, diagnostics }
    }

    /// The generated code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl HasDiagnostics for GeneratedOutput {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
