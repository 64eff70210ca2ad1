//! Error codes for type parsing diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Syntax errors
//! - `E2xx` - Resolution errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A quoted string was opened but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that cannot start any token.
    E002,

    /// Invalid integer literal.
    ///
    /// The literal does not fit in a 64-bit signed integer.
    E003,

    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    ///
    /// The description ended before a complete type was read.
    E101,

    /// Unbalanced delimiter.
    ///
    /// A `<`, `{` or `[` is never closed, or a closing delimiter has no
    /// matching opening one.
    E102,

    /// Empty union arm.
    ///
    /// A `|` is not surrounded by two types, as in `int||string`.
    E103,

    // =========================================================================
    // Resolution Errors (E2xx)
    // =========================================================================
    /// Unknown symbol.
    ///
    /// The name is neither a keyword, a template, nor a known class,
    /// interface or enumeration.
    E200,

    /// Wrong number of generic arguments.
    E201,

    /// Generic arguments given to a type that takes none.
    E202,

    /// Invalid array key type.
    ///
    /// Array keys must be `int`, `string` or `array-key`.
    E203,

    /// Duplicate key in a shaped array.
    E204,

    /// Invalid integer range.
    ///
    /// Bounds must be integer literals, `min` or `max`, and the lower bound
    /// must not exceed the upper one.
    E205,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid integer literal",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unbalanced delimiter",
            ErrorCode::E103 => "empty union arm",
            ErrorCode::E200 => "unknown symbol",
            ErrorCode::E201 => "wrong number of generic arguments",
            ErrorCode::E202 => "unexpected generic arguments",
            ErrorCode::E203 => "invalid array key type",
            ErrorCode::E204 => "duplicate shaped array key",
            ErrorCode::E205 => "invalid integer range",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
