use std::fmt;

use crate::span::Span;

/// Token types of the type description language
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Literals
    Identifier(&'src str),
    IntLiteral(i64),
    StringLiteral(String),

    // Punctuation
    LeftAngle,    // <
    RightAngle,   // >
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Colon,        // :
    Question,     // ?
    Pipe,         // |
    Ellipsis,     // ...
}

impl Token<'_> {
    /// Returns `true` for tokens that close a nested construct.
    pub fn is_closing(&self) -> bool {
        matches!(
            self,
            Token::RightAngle | Token::RightBrace | Token::RightBracket
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "`{name}`"),
            Token::IntLiteral(value) => write!(f, "`{value}`"),
            Token::StringLiteral(value) => write!(f, "'{value}'"),
            Token::LeftAngle => write!(f, "`<`"),
            Token::RightAngle => write!(f, "`>`"),
            Token::LeftBrace => write!(f, "`{{`"),
            Token::RightBrace => write!(f, "`}}`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::Comma => write!(f, "`,`"),
            Token::Colon => write!(f, "`:`"),
            Token::Question => write!(f, "`?`"),
            Token::Pipe => write!(f, "`|`"),
            Token::Ellipsis => write!(f, "`...`"),
        }
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}
