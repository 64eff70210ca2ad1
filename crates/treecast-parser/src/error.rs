//! Error and diagnostic system for the type parser.
//!
//! Every failure is described by a [`Diagnostic`] carrying an [`ErrorCode`],
//! one or more labelled spans into the type description, and optional help
//! text. The diagnostics of one parse are returned together as a
//! [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use treecast_parser::error::{Diagnostic, ErrorCode};
//! # use treecast_parser::Span;
//!
//! let diag = Diagnostic::error("duplicate key `id` in shaped array")
//!     .with_code(ErrorCode::E204)
//!     .with_label(Span::new(17..19), "duplicate key")
//!     .with_secondary_label(Span::new(6..8), "first declared here")
//!     .with_help("remove one of the two elements");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
