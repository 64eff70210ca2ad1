//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the type description.
///
/// - **Primary labels** mark where the problem is.
/// - **Secondary labels** add context, such as "first declared here" or
///   "opened here".
///
/// ```text
/// error[E102]: unclosed `<`
///  |
///  | array<int, list<string>
///  |      ^ opened here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}
