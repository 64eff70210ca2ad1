//! Error adapter for converting TreecastError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A [`treecast_parser::error::ParseError`] is rendered as one report per
//! diagnostic, against the type description it was raised for. Mapping
//! failures are rendered as one report per [`MappingError`], coded with its
//! [`ErrorKind`].

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use treecast::{ErrorKind, MappingError, TreecastError};
use treecast_parser::error::Diagnostic;

/// Adapter for a single type parsing diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// The type description the diagnostic spans point into
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for one failure of a mapping call.
///
/// The message is prefixed by the path of the failing node.
#[derive(Debug)]
pub struct MappingAdapter<'a>(pub &'a MappingError);

impl fmt::Display for MappingAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for MappingAdapter<'_> {}

impl MietteDiagnostic for MappingAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("treecast::{}", self.0.kind())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0.kind() {
            ErrorKind::UnexpectedKey => {
                "remove the key, or set `allow_superfluous_keys = true` in the configuration"
            }
            ErrorKind::InterfaceNotRegistered => {
                "bind the interface in the `[interfaces]` section of the configuration"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// Adapter for [`TreecastError`] variants without node or source information.
pub struct ErrorAdapter<'a>(pub &'a TreecastError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TreecastError::TypeParsing { .. } | TreecastError::Mapping(_) => return None,
            TreecastError::Definition(_) => "treecast::definition",
            TreecastError::TypeGraphTooDeep { .. } => "treecast::type_graph_too_deep",
            TreecastError::Config(_) => "treecast::config",
            TreecastError::Deserialize(_) => "treecast::deserialize",
            TreecastError::Io(_) => "treecast::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            TreecastError::TypeGraphTooDeep { .. } => Some(Box::new(
                "raise `max_depth` in the configuration if the input is that deep",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A type parsing diagnostic with labelled spans.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A failure located at one node of the input.
    Mapping(MappingAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Mapping(m) => fmt::Display::fmt(m, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) | Reportable::Mapping(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Mapping(m) => m.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Mapping(m) => m.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Mapping(_) | Reportable::Error(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Mapping(_) | Reportable::Error(_) => None,
        }
    }
}

fn span_to_miette(span: treecast_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`TreecastError`] into a list of reportable errors.
///
/// Type parsing errors give one [`Reportable`] per diagnostic and mapping
/// errors one per failing node. Other variants give a single
/// [`Reportable`].
pub fn to_reportables(err: &TreecastError) -> Vec<Reportable<'_>> {
    match err {
        TreecastError::TypeParsing { err: parse_err, src } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        TreecastError::Mapping(errors) => errors
            .iter()
            .map(|e| Reportable::Mapping(MappingAdapter(e)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use treecast::{MappingErrors, Path};
    use treecast_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    #[test]
    fn test_one_report_per_diagnostic() {
        let diags = vec![
            Diagnostic::error("first error")
                .with_code(ErrorCode::E101)
                .with_label(Span::new(0..4), "first"),
            Diagnostic::error("second error").with_label(Span::new(5..9), "second"),
        ];
        let err = TreecastError::new_type_parsing(ParseError::new(diags), "list<int");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert!(reportables[0].source_code().is_some());
    }

    #[test]
    fn test_one_report_per_mapping_error() {
        let errors = MappingErrors::new(vec![
            MappingError::new(
                Path::root().key("x"),
                ErrorKind::InvalidScalarValue,
                "value 'a' is not a valid int",
            ),
            MappingError::new(
                Path::root().key("extra"),
                ErrorKind::UnexpectedKey,
                "unexpected key `extra`",
            ),
        ])
        .unwrap();
        let err = TreecastError::Mapping(errors);

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "$.x: value 'a' is not a valid int");
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()).as_deref(),
            Some("treecast::invalid_scalar_value")
        );
        assert!(reportables[0].help().is_none());
        assert!(reportables[1].help().is_some());
        assert!(reportables[1].labels().is_none());
    }

    #[test]
    fn test_other_errors_are_single_reports() {
        let err = TreecastError::Config("transformer `x` is not registered".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()).as_deref(),
            Some("treecast::config")
        );
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..4), "primary")
            .with_secondary_label(Span::new(5..8), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, "list<int>");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("secondary"));
    }
}
