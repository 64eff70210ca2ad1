//! Collector for accumulating diagnostics during a processing phase.
//!
//! Lexing and resolution report every problem they find instead of stopping
//! at the first one.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Finish collection, returning `value` if nothing was emitted.
    pub fn finish<T>(self, value: T) -> Result<T, ParseError> {
        if self.diagnostics.is_empty() {
            Ok(value)
        } else {
            Err(ParseError::new(self.diagnostics))
        }
    }
}
