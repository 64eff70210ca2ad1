//! Lexical analyzer for type descriptions.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.
//! Whitespace separates tokens and is not part of the token stream.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors to provide messages with codes, help text, and
/// the start of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = Result<O, ErrMode<ContextError<LexerDiagnostic>>>;

fn cut_with(diagnostic: LexerDiagnostic) -> ErrMode<ContextError<LexerDiagnostic>> {
    let mut e = ContextError::new();
    e.push(diagnostic);
    ErrMode::Cut(e)
}

/// Parse a quoted string literal.
///
/// Both `'single'` and `"double"` quotes are accepted. A backslash escapes
/// the character that follows it.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let quote = one_of(['\'', '"']).parse_next(input)?;

    let escape = preceded('\\', any);
    let plain = none_of(move |c: char| c == quote || c == '\\');
    let content = repeat(0.., alt((escape, plain))).fold(String::new, |mut acc, ch| {
        acc.push(ch);
        acc
    });

    cut_err(terminated(content, quote))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add the closing quote"),
            start,
        })
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse an integer literal, optionally negative.
fn int_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let digits = (opt('-'), take_while(1.., |c: char| c.is_ascii_digit()))
        .take()
        .parse_next(input)?;

    digits.parse::<i64>().map(Token::IntLiteral).map_err(|_| {
        cut_with(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "integer literal out of range",
            help: Some("integer literals must fit in a signed 64-bit integer"),
            start,
        })
    })
}

/// Parse identifiers and keywords.
///
/// Keywords such as `non-empty-list` contain dashes and class names may be
/// namespaced with backslashes, so both are allowed after the first
/// character.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '\\'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '\\' | '-')
        }),
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

/// Parse punctuation (multi-character first)
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        "...".value(Token::Ellipsis),
        '<'.value(Token::LeftAngle),
        '>'.value(Token::RightAngle),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ','.value(Token::Comma),
        alt((
            ':'.value(Token::Colon),
            '?'.value(Token::Question),
            '|'.value(Token::Pipe),
        )),
    ))
    .parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        string_literal, // Must come before any punctuation
        int_literal,    // Must come before identifier
        identifier,
        punctuation,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Skip whitespace between tokens.
fn whitespace(input: &mut Input<'_>) {
    let _: IResult<&str> = take_while(0.., char::is_whitespace).parse_next(input);
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        loop {
            whitespace(&mut input);
            if input.eof_offset() == 0 {
                break;
            }

            let checkpoint = input.checkpoint();
            let start_pos = input.current_token_start();

            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(ErrMode::Cut(e)) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics
                        .emit(Self::convert_context(&e, start_pos, error_pos));
                    if error_pos == start_pos {
                        input.next_token();
                    }
                }
                Err(_) => {
                    // No token starts here: report the character and skip it.
                    input.reset(&checkpoint);
                    let width = input.next_token().map_or(1, char::len_utf8);
                    self.diagnostics.emit(
                        Diagnostic::error("unexpected character")
                            .with_code(ErrorCode::E002)
                            .with_label(Span::new(start_pos..start_pos + width), "unexpected character")
                            .with_help("type descriptions contain names, literals and `<>{}[],:?|`"),
                    );
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish(self.tokens)
    }

    /// Convert a committed error into a diagnostic.
    ///
    /// Uses the `LexerDiagnostic` context when present, falling back to a
    /// generic E002 otherwise.
    fn convert_context(
        error: &ContextError<LexerDiagnostic>,
        start_pos: usize,
        error_pos: usize,
    ) -> Diagnostic {
        match error.context().next() {
            Some(LexerDiagnostic {
                code,
                message,
                help,
                start,
            }) => {
                let span = Span::new(*start..error_pos.max(*start + 1));
                let diagnostic = Diagnostic::error(*message)
                    .with_code(*code)
                    .with_label(span, code.description());
                match help {
                    Some(help) => diagnostic.with_help(*help),
                    None => diagnostic,
                }
            }
            None => Diagnostic::error("unexpected character")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(start_pos..error_pos.max(start_pos + 1)), "here"),
        }
    }
}

/// Tokenize a type description.
///
/// # Errors
///
/// Returns a [`ParseError`] holding one diagnostic per lexical error.
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(source));
    lexer.finish()
}
