//! Unresolved syntax tree of a type description.
//!
//! Produced by the [`parser`](super::parser) and turned into a
//! [`Type`](treecast_core::types::Type) by [`resolve`](super::resolve).
//! Names are kept as written; whether `Foo` is a keyword, a template, a
//! class or nothing at all is only decided during resolution.

use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeExpr<'src> {
    /// A name, with optional generic arguments and shaped elements:
    /// `int`, `list<int>`, `array{a: int}`, `Box<T>`.
    Named {
        name: Spanned<&'src str>,
        generics: Option<Spanned<Vec<Spanned<TypeExpr<'src>>>>>,
        shape: Option<Spanned<Shape<'src>>>,
    },
    IntLiteral(i64),
    StringLiteral(String),
    /// `?T`
    Nullable(Box<Spanned<TypeExpr<'src>>>),
    /// `T[]`
    ArrayOf(Box<Spanned<TypeExpr<'src>>>),
    /// `A|B|C`, at least two members.
    Union(Vec<Spanned<TypeExpr<'src>>>),
}

/// The `{...}` part of a shaped array.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Shape<'src> {
    pub elements: Vec<ShapeElement<'src>>,
    /// `true` when the shape ends with `...`.
    pub unsealed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ShapeElement<'src> {
    /// `None` for positional elements.
    pub key: Option<Spanned<ShapeKey>>,
    pub optional: bool,
    pub ty: Spanned<TypeExpr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShapeKey {
    Int(i64),
    String(String),
}
