//! Parser for type description tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer)
//! into the unresolved syntax tree of [`syntax`](super::syntax). The public
//! entry point is [`build_type`].
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! union    := nullable ('|' nullable)*
//! nullable := '?' suffixed | suffixed
//! suffixed := atom ('[' ']')*
//! atom     := INT | STRING | NAME generics? shape?
//! generics := '<' union (',' union)* '>'
//! shape    := '{' (element (',' element)* (',' '...')? | '...')? ','? '}'
//! element  := key '?'? ':' union | union
//! ```

use winnow::{
    Parser as _,
    combinator::opt,
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
    syntax::{Shape, ShapeElement, ShapeKey, TypeExpr},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected at the failure position
    Label(&'static str),
    /// A fully formed diagnostic that replaces the generic message
    Diagnostic(Diagnostic),
}

type Input<'src> = TypeTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type TypeTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Delimited constructs of the grammar.
#[derive(Debug, Clone, Copy)]
enum Delimiter {
    Angle,
    Brace,
    Bracket,
}

impl Delimiter {
    fn open(self) -> &'static str {
        match self {
            Delimiter::Angle => "<",
            Delimiter::Brace => "{",
            Delimiter::Bracket => "[",
        }
    }

    fn close(self) -> Token<'static> {
        match self {
            Delimiter::Angle => Token::RightAngle,
            Delimiter::Brace => Token::RightBrace,
            Delimiter::Bracket => Token::RightBracket,
        }
    }
}

/// Create a committed error carrying a diagnostic.
fn fail(diagnostic: Diagnostic) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Diagnostic(diagnostic));
    ErrMode::Cut(e)
}

/// Create a recoverable error describing what was expected.
fn expected(label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Backtrack(e)
}

/// Look at the next token without consuming it.
fn peek<'src>(input: &mut Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let checkpoint = input.checkpoint();
    let token = input.next_token();
    input.reset(&checkpoint);
    token
}

/// Parse a single punctuation token, returning its span.
fn punct<'src>(expected: Token<'static>) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify(|token: &PositionedToken<'_>| token.token == expected)
            .map(|token: &PositionedToken<'src>| token.span)
            .parse_next(input)
    }
}

/// Consume the closing delimiter matching `open`.
fn closing<'src>(input: &mut Input<'src>, open: Span, delimiter: Delimiter) -> IResult<Span> {
    let close = delimiter.close();
    match peek(input) {
        Some(token) if token.token == close => {
            input.next_token();
            Ok(token.span)
        }
        Some(token) => Err(fail(
            Diagnostic::error(format!("unclosed `{}`", delimiter.open()))
                .with_code(ErrorCode::E102)
                .with_label(token.span, format!("expected {close}, found {}", token.token))
                .with_secondary_label(open, "opened here"),
        )),
        None => Err(fail(
            Diagnostic::error(format!("unclosed `{}`", delimiter.open()))
                .with_code(ErrorCode::E102)
                .with_label(open, "never closed")
                .with_help(format!("add {close} at the end")),
        )),
    }
}

/// Parse `A|B|C`
fn union_type<'src>(input: &mut Input<'src>) -> IResult<Spanned<TypeExpr<'src>>> {
    let mut members = vec![nullable_type(input)?];

    while let Some(pipe) = opt(punct(Token::Pipe)).parse_next(input)? {
        let arm_follows = peek(input).is_some_and(|token| {
            !token.is_closing()
                && !matches!(
                    token.token,
                    Token::Pipe | Token::Comma | Token::Colon | Token::Ellipsis
                )
        });
        if !arm_follows {
            return Err(fail(
                Diagnostic::error("empty union arm")
                    .with_code(ErrorCode::E103)
                    .with_label(pipe, "expected a type after `|`")
                    .with_help("remove the extra `|` or add the missing type"),
            ));
        }
        members.push(nullable_type(input)?);
    }

    if members.len() == 1 {
        return Ok(members.remove(0));
    }
    let span = members[0].span().union(members[members.len() - 1].span());
    Ok(Spanned::new(TypeExpr::Union(members), span))
}

/// Parse `?T`
fn nullable_type<'src>(input: &mut Input<'src>) -> IResult<Spanned<TypeExpr<'src>>> {
    match opt(punct(Token::Question)).parse_next(input)? {
        Some(question) => {
            let inner = suffixed_type(input)?;
            let span = question.union(inner.span());
            Ok(Spanned::new(TypeExpr::Nullable(Box::new(inner)), span))
        }
        None => suffixed_type(input),
    }
}

/// Parse `T[]`, possibly repeated
fn suffixed_type<'src>(input: &mut Input<'src>) -> IResult<Spanned<TypeExpr<'src>>> {
    let mut ty = atom(input)?;
    while let Some(open) = opt(punct(Token::LeftBracket)).parse_next(input)? {
        let close = closing(input, open, Delimiter::Bracket)?;
        let span = ty.span().union(close);
        ty = Spanned::new(TypeExpr::ArrayOf(Box::new(ty)), span);
    }
    Ok(ty)
}

/// Parse a literal or a name with its optional generics and shape
fn atom<'src>(input: &mut Input<'src>) -> IResult<Spanned<TypeExpr<'src>>> {
    let checkpoint = input.checkpoint();
    let Some(token) = input.next_token() else {
        return Err(expected("a type"));
    };

    match &token.token {
        Token::IntLiteral(value) => Ok(Spanned::new(TypeExpr::IntLiteral(*value), token.span)),
        Token::StringLiteral(value) => Ok(Spanned::new(
            TypeExpr::StringLiteral(value.clone()),
            token.span,
        )),
        Token::Identifier(name) => {
            let name = Spanned::new(*name, token.span);
            let generics = generic_arguments(input)?;
            let shape = shape(input)?;

            let mut span = name.span();
            if let Some(generics) = &generics {
                span = span.union(generics.span());
            }
            if let Some(shape) = &shape {
                span = span.union(shape.span());
            }
            Ok(Spanned::new(
                TypeExpr::Named {
                    name,
                    generics,
                    shape,
                },
                span,
            ))
        }
        Token::Pipe => Err(fail(
            Diagnostic::error("empty union arm")
                .with_code(ErrorCode::E103)
                .with_label(token.span, "expected a type before `|`")
                .with_help("remove the extra `|` or add the missing type"),
        )),
        _ => {
            input.reset(&checkpoint);
            Err(expected("a type"))
        }
    }
}

/// Parse `<A, B>`
fn generic_arguments<'src>(
    input: &mut Input<'src>,
) -> IResult<Option<Spanned<Vec<Spanned<TypeExpr<'src>>>>>> {
    let Some(open) = opt(punct(Token::LeftAngle)).parse_next(input)? else {
        return Ok(None);
    };

    let mut arguments = vec![union_type(input)?];
    while opt(punct(Token::Comma)).parse_next(input)?.is_some() {
        arguments.push(union_type(input)?);
    }

    let close = closing(input, open, Delimiter::Angle)?;
    Ok(Some(Spanned::new(arguments, open.union(close))))
}

/// Parse `{a: int, b?: string, ...}`
fn shape<'src>(input: &mut Input<'src>) -> IResult<Option<Spanned<Shape<'src>>>> {
    let Some(open) = opt(punct(Token::LeftBrace)).parse_next(input)? else {
        return Ok(None);
    };

    let mut elements = Vec::new();
    let mut unsealed = false;
    loop {
        match peek(input).map(|token| &token.token) {
            Some(Token::RightBrace) => break,
            Some(Token::Ellipsis) => {
                input.next_token();
                unsealed = true;
                opt(punct(Token::Comma)).parse_next(input)?;
                break;
            }
            _ => elements.push(shape_element(input)?),
        }
        if opt(punct(Token::Comma)).parse_next(input)?.is_none() {
            break;
        }
    }

    let close = closing(input, open, Delimiter::Brace)?;
    Ok(Some(Spanned::new(
        Shape { elements, unsealed },
        open.union(close),
    )))
}

/// Parse one shaped element, keyed or positional
fn shape_element<'src>(input: &mut Input<'src>) -> IResult<ShapeElement<'src>> {
    let checkpoint = input.checkpoint();

    if let Some(key) = shape_key(input) {
        let optional = opt(punct(Token::Question)).parse_next(input)?.is_some();
        if opt(punct(Token::Colon)).parse_next(input)?.is_some() {
            let ty = union_type(input)?;
            return Ok(ShapeElement {
                key: Some(key),
                optional,
                ty,
            });
        }
        // Not a key after all: `array{int, string}`
        input.reset(&checkpoint);
    }

    let ty = union_type(input)?;
    Ok(ShapeElement {
        key: None,
        optional: false,
        ty,
    })
}

fn shape_key<'src>(input: &mut Input<'src>) -> Option<Spanned<ShapeKey>> {
    let token = peek(input)?;
    let key = match &token.token {
        Token::Identifier(name) => ShapeKey::String((*name).to_string()),
        Token::StringLiteral(name) => ShapeKey::String(name.clone()),
        Token::IntLiteral(index) => ShapeKey::Int(*index),
        _ => return None,
    };
    input.next_token();
    Some(Spanned::new(key, token.span))
}

/// Ensure no tokens remain after the type
fn end_of_input<'src>(input: &mut Input<'src>) -> IResult<()> {
    match peek(input) {
        None => Ok(()),
        Some(token) if token.is_closing() => Err(fail(
            Diagnostic::error(format!("unmatched {}", token.token))
                .with_code(ErrorCode::E102)
                .with_label(token.span, "no matching opening delimiter"),
        )),
        Some(token) => Err(fail(
            Diagnostic::error(format!("unexpected {} after the type", token.token))
                .with_code(ErrorCode::E100)
                .with_label(token.span, "unexpected token")
                .with_help("combine alternatives with `|`"),
        )),
    }
}

/// Utility function to convert winnow errors to our diagnostic format
///
/// A [`Context::Diagnostic`] is returned as-is. Otherwise the error is
/// reported at the token where parsing stopped, or at the end of input.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => Some(e),
        ErrMode::Incomplete(_) => None,
    };

    if let Some(diagnostic) = context.and_then(|e| {
        e.context().find_map(|ctx| match ctx {
            Context::Diagnostic(diagnostic) => Some(diagnostic.clone()),
            Context::Label(_) => None,
        })
    }) {
        return diagnostic;
    }

    let expected = context
        .and_then(|e| {
            e.context().find_map(|ctx| match ctx {
                Context::Label(label) => Some(*label),
                Context::Diagnostic(_) => None,
            })
        })
        .unwrap_or("a type");

    match tokens.get(tokens.len() - current_remaining) {
        Some(token) => Diagnostic::error(format!("unexpected {}, expected {expected}", token.token))
            .with_code(ErrorCode::E100)
            .with_label(token.span, "unexpected token"),
        None => {
            let span = tokens
                .last()
                .map_or_else(Span::default, |token| token.span.end_point());
            Diagnostic::error(format!("incomplete type description, expected {expected}"))
                .with_code(ErrorCode::E101)
                .with_label(span, "input ends here")
        }
    }
}

/// Build the syntax tree of a type description from its tokens
pub(crate) fn build_type<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Spanned<TypeExpr<'src>>, Diagnostic> {
    if tokens.is_empty() {
        return Err(Diagnostic::error("empty type description")
            .with_code(ErrorCode::E101)
            .with_label(Span::default(), "expected a type"));
    }

    let mut token_slice = TokenSlice::new(tokens);

    let result = union_type
        .parse_next(&mut token_slice)
        .and_then(|ty| end_of_input(&mut token_slice).map(|()| ty));

    result.map_err(|e| {
        let current_remaining = token_slice.eof_offset();
        convert_error(e, tokens, current_remaining)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    // The syntax tree borrows its tokens, so tests leak them.
    fn parse_ok(source: &'static str) -> TypeExpr<'static> {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let tokens: &'static [PositionedToken<'static>] = Box::leak(tokens.into_boxed_slice());
        build_type(tokens)
            .expect("Failed to parse tokens")
            .into_inner()
    }

    fn parse_err(source: &'static str) -> Diagnostic {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let tokens: &'static [PositionedToken<'static>] = Box::leak(tokens.into_boxed_slice());
        build_type(tokens).expect_err("Expected parse failure")
    }

    fn name_of<'a>(expr: &'a TypeExpr<'_>) -> &'a str {
        match expr {
            TypeExpr::Named { name, .. } => name.inner(),
            other => panic!("Expected named type, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_name() {
        let expr = parse_ok("int");
        assert_eq!(name_of(&expr), "int");
    }

    #[test]
    fn test_union_members_in_order() {
        match parse_ok("null|int|string") {
            TypeExpr::Union(members) => {
                let names: Vec<_> = members.iter().map(|member| name_of(member)).collect();
                assert_eq!(names, ["null", "int", "string"]);
            }
            other => panic!("Expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_generics() {
        match parse_ok("array<string, list<int>>") {
            TypeExpr::Named {
                name,
                generics: Some(generics),
                shape: None,
            } => {
                assert_eq!(*name.inner(), "array");
                assert_eq!(generics.len(), 2);
                assert_eq!(name_of(&generics[0]), "string");
                assert_eq!(name_of(&generics[1]), "list");
            }
            other => panic!("Expected generic array, got {other:?}"),
        }
    }

    #[test]
    fn test_nullable_binds_to_suffixed_type() {
        match parse_ok("?int[]") {
            TypeExpr::Nullable(inner) => {
                assert!(matches!(inner.inner(), TypeExpr::ArrayOf(_)));
            }
            other => panic!("Expected nullable, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_with_keys_positional_and_unsealed() {
        let expr = parse_ok("array{id: int, 'full name'?: string, 3: bool, float, ...}");
        let TypeExpr::Named {
            shape: Some(shape), ..
        } = expr
        else {
            panic!("Expected shaped array");
        };

        let shape = shape.into_inner();
        assert!(shape.unsealed);
        assert_eq!(shape.elements.len(), 4);
        assert_eq!(
            shape.elements[0].key.as_ref().map(|key| key.inner().clone()),
            Some(ShapeKey::String("id".to_string()))
        );
        assert!(shape.elements[1].optional);
        assert_eq!(
            shape.elements[2].key.as_ref().map(|key| key.inner().clone()),
            Some(ShapeKey::Int(3))
        );
        assert!(shape.elements[3].key.is_none());
    }

    #[test]
    fn test_empty_shape() {
        let TypeExpr::Named {
            shape: Some(shape), ..
        } = parse_ok("array{}")
        else {
            panic!("Expected shaped array");
        };
        assert!(shape.elements.is_empty());
        assert!(!shape.unsealed);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_ok("-3"), TypeExpr::IntLiteral(-3));
        assert_eq!(
            parse_ok("'draft'"),
            TypeExpr::StringLiteral("draft".to_string())
        );
    }

    #[test]
    fn test_unclosed_generics() {
        let diag = parse_err("array<int, list<string>");
        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(diag.message(), "unclosed `<`");
        assert_eq!(diag.primary_span(), Some(Span::new(5..6)));
    }

    #[test]
    fn test_mismatched_closing_delimiter() {
        let diag = parse_err("array{a: int>");
        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(diag.labels().len(), 2);
    }

    #[test]
    fn test_unmatched_closing_delimiter() {
        let diag = parse_err("int>");
        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(diag.primary_span(), Some(Span::new(3..4)));
    }

    #[test]
    fn test_empty_union_arms() {
        for source in ["int||string", "int|", "|int", "list<int|>"] {
            assert_eq!(
                parse_err(source).code(),
                Some(ErrorCode::E103),
                "source: {source}"
            );
        }
    }

    #[test]
    fn test_missing_generic_argument() {
        let diag = parse_err("list<>");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.message(), "unexpected `>`, expected a type");
    }

    #[test]
    fn test_trailing_tokens() {
        let diag = parse_err("int string");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.primary_span(), Some(Span::new(4..10)));
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(parse_err("").code(), Some(ErrorCode::E101));
    }
}
