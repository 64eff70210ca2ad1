//! Resolution of syntax trees into types.
//!
//! Names are looked up in this order: templates of the active
//! [`Specification`], built-in keywords, then the [`SymbolSource`]. Every
//! problem is reported; a failed node resolves to `mixed` so the rest of the
//! tree can still be checked.

use std::collections::HashMap;

use treecast_core::{
    reflection::{Symbol, SymbolKind, SymbolSource},
    types::{
        ArrayKeyType, ArrayType, ClassType, EnumType, ScalarKind, ShapedArrayType,
        ShapedElement, Type,
    },
    value::MapKey,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
    specification::Specification,
    syntax::{Shape, ShapeKey, TypeExpr},
};

type Arguments<'a, 'src> = &'a [Spanned<TypeExpr<'src>>];

/// Resolve a syntax tree under the given specification.
pub(crate) fn resolve(
    expr: &Spanned<TypeExpr<'_>>,
    specification: &dyn Specification,
    symbols: &dyn SymbolSource,
) -> Result<Type, ParseError> {
    let mut resolver = Resolver {
        specification,
        symbols,
        diagnostics: DiagnosticCollector::new(),
        emitted: 0,
    };
    let ty = resolver.resolve(expr);
    resolver.diagnostics.finish(ty)
}

struct Resolver<'a> {
    specification: &'a dyn Specification,
    symbols: &'a dyn SymbolSource,
    diagnostics: DiagnosticCollector,
    emitted: usize,
}

impl Resolver<'_> {
    fn emit(&mut self, diagnostic: Diagnostic) -> Type {
        self.diagnostics.emit(diagnostic);
        self.emitted += 1;
        Type::Mixed
    }

    fn resolve(&mut self, expr: &Spanned<TypeExpr<'_>>) -> Type {
        match expr.inner() {
            TypeExpr::IntLiteral(value) => Type::Scalar(ScalarKind::IntValue(*value)),
            TypeExpr::StringLiteral(value) => Type::Scalar(ScalarKind::StringValue(value.clone())),
            TypeExpr::Nullable(inner) => Type::nullable(self.resolve(inner)),
            TypeExpr::ArrayOf(inner) => Type::array(ArrayKeyType::ArrayKey, self.resolve(inner)),
            TypeExpr::Union(members) => {
                let members: Vec<_> = members.iter().map(|member| self.resolve(member)).collect();
                Type::union(members)
            }
            TypeExpr::Named {
                name,
                generics,
                shape,
            } => match shape {
                Some(shape) => self.shaped(name, generics.is_some(), shape),
                None => {
                    let arguments = generics.as_ref().map_or(&[][..], |g| g.inner().as_slice());
                    let generics_span = generics.as_ref().map_or(name.span(), Spanned::span);
                    self.named(name, arguments, generics_span)
                }
            },
        }
    }

    fn named(&mut self, name: &Spanned<&str>, arguments: Arguments, generics_span: Span) -> Type {
        let keyword = *name.inner();

        if arguments.is_empty() {
            if let Some(bound) = self.specification.template(keyword) {
                return bound.clone();
            }
        }

        match keyword {
            "array" | "non-empty-array" | "iterable" => {
                return self.array_like(keyword, arguments, generics_span);
            }
            "list" | "non-empty-list" => return self.list(keyword, arguments, generics_span),
            "int" | "integer" if !arguments.is_empty() => {
                return self.int_range(arguments, generics_span);
            }
            _ => {}
        }

        if let Some(ty) = scalar_keyword(keyword) {
            if !arguments.is_empty() {
                return self.emit(
                    Diagnostic::error(format!("`{keyword}` does not take generic arguments"))
                        .with_code(ErrorCode::E202)
                        .with_label(generics_span, "unexpected generic arguments"),
                );
            }
            return ty;
        }

        match self.symbols.symbol(keyword) {
            Some(symbol) => self.symbol(name, &symbol, arguments, generics_span),
            None => self.emit(
                Diagnostic::error(format!("unknown symbol `{keyword}`"))
                    .with_code(ErrorCode::E200)
                    .with_label(name.span(), "not a class, interface or enumeration")
                    .with_help("register the class, interface or enumeration before using it"),
            ),
        }
    }

    fn array_like(&mut self, keyword: &str, arguments: Arguments, span: Span) -> Type {
        let (key, value) = match arguments {
            [] => (ArrayKeyType::ArrayKey, Type::Mixed),
            [value] => (ArrayKeyType::ArrayKey, self.resolve(value)),
            [key, value] => (self.array_key(key), self.resolve(value)),
            _ => {
                return self.emit(
                    Diagnostic::error(format!(
                        "`{keyword}` takes at most 2 generic arguments, found {}",
                        arguments.len()
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(span, "too many generic arguments"),
                );
            }
        };

        let array = ArrayType::new(key, value);
        match keyword {
            "non-empty-array" => Type::NonEmptyArray(array),
            "iterable" => Type::Iterable(array),
            _ => Type::Array(array),
        }
    }

    fn array_key(&mut self, expr: &Spanned<TypeExpr<'_>>) -> ArrayKeyType {
        let before = self.emitted;
        let ty = self.resolve(expr);
        match ty {
            Type::Scalar(ScalarKind::Int) => ArrayKeyType::Int,
            Type::Scalar(ScalarKind::String) => ArrayKeyType::String,
            Type::Scalar(ScalarKind::ArrayKey) => ArrayKeyType::ArrayKey,
            // Already reported while resolving the key itself.
            _ if self.emitted > before => ArrayKeyType::ArrayKey,
            other => {
                self.emit(
                    Diagnostic::error(format!("invalid array key type `{other}`"))
                        .with_code(ErrorCode::E203)
                        .with_label(expr.span(), "not a valid key type")
                        .with_help("array keys must be `int`, `string` or `array-key`"),
                );
                ArrayKeyType::ArrayKey
            }
        }
    }

    fn list(&mut self, keyword: &str, arguments: Arguments, span: Span) -> Type {
        let value = match arguments {
            [] => Type::Mixed,
            [value] => self.resolve(value),
            _ => {
                return self.emit(
                    Diagnostic::error(format!(
                        "`{keyword}` takes at most 1 generic argument, found {}",
                        arguments.len()
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(span, "too many generic arguments"),
                );
            }
        };

        if keyword == "non-empty-list" {
            Type::non_empty_list(value)
        } else {
            Type::list(value)
        }
    }

    fn int_range(&mut self, arguments: Arguments, span: Span) -> Type {
        let [min, max] = arguments else {
            return self.emit(
                Diagnostic::error(format!(
                    "`int<min, max>` takes 2 generic arguments, found {}",
                    arguments.len()
                ))
                .with_code(ErrorCode::E201)
                .with_label(span, "expected a lower and an upper bound"),
            );
        };

        let (Some(min_bound), Some(max_bound)) = (self.bound(min, "min"), self.bound(max, "max"))
        else {
            return Type::Mixed;
        };

        match (min_bound, max_bound) {
            (Some(low), Some(high)) if low > high => self.emit(
                Diagnostic::error(format!(
                    "lower bound {low} is greater than upper bound {high}"
                ))
                .with_code(ErrorCode::E205)
                .with_label(span, "empty integer range"),
            ),
            (None, None) => Type::Scalar(ScalarKind::Int),
            (min, max) => Type::Scalar(ScalarKind::IntRange { min, max }),
        }
    }

    /// A range bound: `Some(Some(n))` for a literal, `Some(None)` for the
    /// open keyword, `None` after reporting an invalid bound.
    fn bound(&mut self, expr: &Spanned<TypeExpr<'_>>, open: &str) -> Option<Option<i64>> {
        match expr.inner() {
            TypeExpr::IntLiteral(value) => Some(Some(*value)),
            TypeExpr::Named {
                name,
                generics: None,
                shape: None,
            } if *name.inner() == open => Some(None),
            _ => {
                self.emit(
                    Diagnostic::error("invalid integer range bound")
                        .with_code(ErrorCode::E205)
                        .with_label(expr.span(), format!("expected an integer or `{open}`")),
                );
                None
            }
        }
    }

    fn shaped(&mut self, name: &Spanned<&str>, has_generics: bool, shape: &Spanned<Shape<'_>>) -> Type {
        if *name.inner() != "array" || has_generics {
            return self.emit(
                Diagnostic::error(format!(
                    "`{}` does not accept shaped elements",
                    name.inner()
                ))
                .with_code(ErrorCode::E202)
                .with_label(shape.span(), "only `array{...}` can be shaped"),
            );
        }

        let mut seen: HashMap<MapKey, Span> = HashMap::new();
        let mut elements = Vec::with_capacity(shape.elements.len());
        let mut next_index: i64 = 0;

        for element in &shape.elements {
            let (key, key_span) = match &element.key {
                Some(key) => {
                    let map_key = match key.inner() {
                        ShapeKey::Int(index) => MapKey::Int(*index),
                        ShapeKey::String(name) => MapKey::String(name.clone()),
                    };
                    (map_key, key.span())
                }
                None => (MapKey::Int(next_index), element.ty.span()),
            };
            if let MapKey::Int(index) = key {
                next_index = next_index.max(index.saturating_add(1));
            }

            let ty = self.resolve(&element.ty);

            if let Some(first) = seen.get(&key) {
                self.emit(
                    Diagnostic::error(format!("duplicate key `{key}` in shaped array"))
                        .with_code(ErrorCode::E204)
                        .with_label(key_span, "duplicate key")
                        .with_secondary_label(*first, "first declared here")
                        .with_help("remove one of the two elements"),
                );
                continue;
            }
            seen.insert(key.clone(), key_span);
            elements.push(ShapedElement::new(key, ty, element.optional));
        }

        let shaped = ShapedArrayType::new(elements);
        Type::ShapedArray(if shape.unsealed {
            shaped.unsealed()
        } else {
            shaped
        })
    }

    fn symbol(
        &mut self,
        name: &Spanned<&str>,
        symbol: &Symbol,
        arguments: Arguments,
        generics_span: Span,
    ) -> Type {
        if symbol.kind() == SymbolKind::Enum {
            if !arguments.is_empty() {
                return self.emit(
                    Diagnostic::error(format!("enumeration `{}` is not generic", symbol.name()))
                        .with_code(ErrorCode::E202)
                        .with_label(generics_span, "unexpected generic arguments"),
                );
            }
            return Type::Enum(EnumType::new(symbol.name(), symbol.cases().to_vec()));
        }

        let templates = symbol.templates();
        if !arguments.is_empty() && templates.is_empty() {
            return self.emit(
                Diagnostic::error(format!("`{}` is not generic", name.inner()))
                    .with_code(ErrorCode::E202)
                    .with_label(generics_span, "unexpected generic arguments")
                    .with_help("remove the generic arguments"),
            );
        }
        if !arguments.is_empty() && arguments.len() != templates.len() {
            return self.emit(
                Diagnostic::error(format!(
                    "`{}` expects {} generic argument(s), found {}",
                    name.inner(),
                    templates.len(),
                    arguments.len()
                ))
                .with_code(ErrorCode::E201)
                .with_label(generics_span, "wrong number of generic arguments")
                .with_help(format!("declared templates: {}", templates.join(", "))),
            );
        }

        let generics = templates
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let bound = arguments
                    .get(index)
                    .map_or(Type::Mixed, |argument| self.resolve(argument));
                (template.clone(), bound)
            })
            .collect();
        let class = ClassType::new(symbol.name()).with_generics(generics);

        match symbol.kind() {
            SymbolKind::Interface => Type::Interface(class),
            _ => Type::Class(class),
        }
    }
}

/// Types named by a single keyword.
fn scalar_keyword(keyword: &str) -> Option<Type> {
    let kind = match keyword {
        "null" => return Some(Type::Null),
        "mixed" => return Some(Type::Mixed),
        "bool" | "boolean" => ScalarKind::Bool,
        "true" => ScalarKind::BoolValue(true),
        "false" => ScalarKind::BoolValue(false),
        "int" | "integer" => ScalarKind::Int,
        "positive-int" => ScalarKind::PositiveInt,
        "negative-int" => ScalarKind::NegativeInt,
        "float" | "double" => ScalarKind::Float,
        "string" => ScalarKind::String,
        "non-empty-string" => ScalarKind::NonEmptyString,
        "array-key" => ScalarKind::ArrayKey,
        _ => return None,
    };
    Some(Type::Scalar(kind))
}
