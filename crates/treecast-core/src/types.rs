//! Type AST for Treecast type descriptions.
//!
//! A [`Type`] is the immutable, fully resolved form of a type description such
//! as `list<int>`, `array{name: string, age?: positive-int}` or
//! `null|Point<float>`. Types are produced by `treecast-parser` and consumed by
//! the mapping engine, which dispatches on the variant.
//!
//! Every type has a canonical [`Display`](fmt::Display) form that parses back
//! into an equal type.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::MapKey;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// The `null` type.
    Null,
    /// Accepts any value as-is.
    Mixed,
    /// A scalar type.
    Scalar(ScalarKind),
    /// `array<K, V>`: a mapping with validated keys.
    Array(ArrayType),
    /// `non-empty-array<K, V>`.
    NonEmptyArray(ArrayType),
    /// `iterable<K, V>`.
    Iterable(ArrayType),
    /// `list<V>`: a sequence indexed from zero.
    List(Box<Type>),
    /// `non-empty-list<V>`.
    NonEmptyList(Box<Type>),
    /// `array{a: int, b?: string}`.
    ShapedArray(ShapedArrayType),
    /// A reference to a constructible class.
    Class(ClassType),
    /// A reference to an interface that must be bound to a class.
    Interface(ClassType),
    /// A reference to an enumeration.
    Enum(EnumType),
    /// Two or more distinct alternatives.
    Union(UnionType),
}

impl Type {
    /// Build a list type.
    pub fn list(value: Type) -> Self {
        Type::List(Box::new(value))
    }

    /// Build a non-empty list type.
    pub fn non_empty_list(value: Type) -> Self {
        Type::NonEmptyList(Box::new(value))
    }

    /// Build an `array<K, V>` type.
    pub fn array(key: ArrayKeyType, value: Type) -> Self {
        Type::Array(ArrayType::new(key, value))
    }

    /// Build a union from the given members.
    ///
    /// Nested unions are flattened and duplicates removed, keeping the first
    /// occurrence. When a single distinct member remains it is returned
    /// as-is, so a [`Type::Union`] always holds at least two members. An
    /// empty member list yields [`Type::Mixed`].
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            let nested = match member {
                Type::Union(union) => union.0,
                other => vec![other],
            };
            for ty in nested {
                if !flat.contains(&ty) {
                    flat.push(ty);
                }
            }
        }

        match flat.len() {
            0 => Type::Mixed,
            1 => flat.remove(0),
            _ => Type::Union(UnionType(flat)),
        }
    }

    /// Build `null|T`.
    pub fn nullable(ty: Type) -> Self {
        Type::union([Type::Null, ty])
    }

    /// Returns `true` for types whose input is a mapping or a sequence.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            Type::Array(_)
                | Type::NonEmptyArray(_)
                | Type::Iterable(_)
                | Type::List(_)
                | Type::NonEmptyList(_)
                | Type::ShapedArray(_)
                | Type::Class(_)
                | Type::Interface(_)
        )
    }

    /// Returns `true` if `null` is an accepted value for this type.
    pub fn accepts_null(&self) -> bool {
        match self {
            Type::Null | Type::Mixed => true,
            Type::Union(union) => union.members().iter().any(Type::accepts_null),
            _ => false,
        }
    }

    /// Short name of the category this type belongs to, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Mixed => "mixed",
            Type::Scalar(_) => "scalar",
            Type::Array(_) => "array",
            Type::NonEmptyArray(_) => "non-empty-array",
            Type::Iterable(_) => "iterable",
            Type::List(_) => "list",
            Type::NonEmptyList(_) => "non-empty-list",
            Type::ShapedArray(_) => "shaped-array",
            Type::Class(_) => "class",
            Type::Interface(_) => "interface",
            Type::Enum(_) => "enum",
            Type::Union(_) => "union",
        }
    }
}

/// Scalar type kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    Int,
    PositiveInt,
    NegativeInt,
    /// `int<min, max>`; `None` stands for an open bound.
    IntRange {
        min: Option<i64>,
        max: Option<i64>,
    },
    Float,
    String,
    NonEmptyString,
    /// `array-key`: an integer or a string.
    ArrayKey,
    /// An integer literal such as `42`.
    IntValue(i64),
    /// A string literal such as `'draft'`.
    StringValue(String),
    /// `true` or `false`.
    BoolValue(bool),
}

impl ScalarKind {
    /// Returns `true` if the given integer satisfies this kind's bounds.
    ///
    /// Non-integer kinds return `false`.
    pub fn accepts_int(&self, value: i64) -> bool {
        match self {
            ScalarKind::Int | ScalarKind::ArrayKey => true,
            ScalarKind::PositiveInt => value > 0,
            ScalarKind::NegativeInt => value < 0,
            ScalarKind::IntRange { min, max } => {
                min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
            }
            ScalarKind::IntValue(expected) => *expected == value,
            _ => false,
        }
    }

    /// Returns `true` for the integer family of kinds.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::PositiveInt
                | ScalarKind::NegativeInt
                | ScalarKind::IntRange { .. }
                | ScalarKind::IntValue(_)
        )
    }
}

/// Key type of an `array<K, V>` family type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrayKeyType {
    Int,
    String,
    #[default]
    ArrayKey,
}

impl fmt::Display for ArrayKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKeyType::Int => write!(f, "int"),
            ArrayKeyType::String => write!(f, "string"),
            ArrayKeyType::ArrayKey => write!(f, "array-key"),
        }
    }
}

/// Key and value types of an `array<K, V>` family type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    key: ArrayKeyType,
    value: Box<Type>,
}

impl ArrayType {
    pub fn new(key: ArrayKeyType, value: Type) -> Self {
        Self {
            key,
            value: Box::new(value),
        }
    }

    pub fn key(&self) -> ArrayKeyType {
        self.key
    }

    pub fn value(&self) -> &Type {
        &self.value
    }
}

/// A single declared element of a shaped array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapedElement {
    key: MapKey,
    ty: Type,
    optional: bool,
}

impl ShapedElement {
    pub fn new(key: MapKey, ty: Type, optional: bool) -> Self {
        Self { key, ty, optional }
    }

    pub fn key(&self) -> &MapKey {
        &self.key
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// `array{...}`: a fixed set of keyed elements.
///
/// An unsealed shape (`array{a: int, ...}`) tolerates keys that are not
/// declared; they are dropped from the built value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapedArrayType {
    elements: Vec<ShapedElement>,
    sealed: bool,
}

impl ShapedArrayType {
    pub fn new(elements: Vec<ShapedElement>) -> Self {
        Self {
            elements,
            sealed: true,
        }
    }

    /// Mark the shape as unsealed.
    pub fn unsealed(mut self) -> Self {
        self.sealed = false;
        self
    }

    pub fn elements(&self) -> &[ShapedElement] {
        &self.elements
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Find the element declared for `key`.
    pub fn element(&self, key: &MapKey) -> Option<&ShapedElement> {
        self.elements.iter().find(|element| element.key() == key)
    }
}

/// A named class or interface with its generic bindings.
///
/// Generics map declared template names to the types bound to them, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    name: String,
    generics: IndexMap<String, Type>,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: IndexMap::new(),
        }
    }

    /// Bind generics (builder style).
    pub fn with_generics(mut self, generics: IndexMap<String, Type>) -> Self {
        self.generics = generics;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generics(&self) -> &IndexMap<String, Type> {
        &self.generics
    }

    /// Stable identity of this class and its bindings, e.g. `Box<T=int>`.
    ///
    /// Used to key cached definitions.
    pub fn signature(&self) -> String {
        if self.generics.is_empty() {
            return self.name.clone();
        }
        let bindings = self
            .generics
            .iter()
            .map(|(template, ty)| format!("{template}={ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}<{bindings}>", self.name)
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.generics.is_empty() {
            write!(f, "<")?;
            write_joined(f, self.generics.values(), ", ")?;
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// The backing value of an enumeration case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumBacking {
    Int(i64),
    String(String),
}

impl fmt::Display for EnumBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumBacking::Int(value) => write!(f, "{value}"),
            EnumBacking::String(value) => write!(f, "'{value}'"),
        }
    }
}

/// A single enumeration case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCase {
    name: String,
    #[serde(default)]
    value: Option<EnumBacking>,
}

impl EnumCase {
    /// A pure case, matched by name.
    pub fn pure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A backed case, matched by its backing value.
    pub fn backed(name: impl Into<String>, value: EnumBacking) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&EnumBacking> {
        self.value.as_ref()
    }
}

/// An enumeration together with its cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    cases: Vec<EnumCase>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, cases: Vec<EnumCase>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    /// Returns `true` when every case carries a backing value.
    pub fn is_backed(&self) -> bool {
        !self.cases.is_empty() && self.cases.iter().all(|case| case.value.is_some())
    }
}

/// The members of a union, always two or more distinct types.
///
/// Construct through [`Type::union`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionType(Vec<Type>);

impl UnionType {
    pub fn members(&self) -> &[Type] {
        &self.0
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Mixed => write!(f, "mixed"),
            Type::Scalar(kind) => write!(f, "{kind}"),
            Type::Array(array) => write!(f, "array<{}, {}>", array.key, array.value),
            Type::NonEmptyArray(array) => {
                write!(f, "non-empty-array<{}, {}>", array.key, array.value)
            }
            Type::Iterable(array) => write!(f, "iterable<{}, {}>", array.key, array.value),
            Type::List(value) => write!(f, "list<{value}>"),
            Type::NonEmptyList(value) => write!(f, "non-empty-list<{value}>"),
            Type::ShapedArray(shape) => write!(f, "{shape}"),
            Type::Class(class) | Type::Interface(class) => write!(f, "{class}"),
            Type::Enum(enumeration) => write!(f, "{}", enumeration.name),
            Type::Union(union) => write_joined(f, union.members(), "|"),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::PositiveInt => write!(f, "positive-int"),
            ScalarKind::NegativeInt => write!(f, "negative-int"),
            ScalarKind::IntRange { min, max } => {
                let bound = |bound: &Option<i64>, open: &str| {
                    bound.map_or_else(|| open.to_string(), |value| value.to_string())
                };
                write!(f, "int<{}, {}>", bound(min, "min"), bound(max, "max"))
            }
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::String => write!(f, "string"),
            ScalarKind::NonEmptyString => write!(f, "non-empty-string"),
            ScalarKind::ArrayKey => write!(f, "array-key"),
            ScalarKind::IntValue(value) => write!(f, "{value}"),
            ScalarKind::StringValue(value) => write_quoted(f, value),
            ScalarKind::BoolValue(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for ShapedArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array{{")?;
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match &element.key {
                MapKey::Int(key) => write!(f, "{key}")?,
                MapKey::String(key) if is_plain_key(key) => write!(f, "{key}")?,
                MapKey::String(key) => write_quoted(f, key)?,
            }
            if element.optional {
                write!(f, "?")?;
            }
            write!(f, ": {}", element.ty)?;
        }
        if !self.sealed {
            if !self.elements.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, "}}")
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I, separator: &str) -> fmt::Result
where
    I: IntoIterator<Item = &'a Type>,
{
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'")?;
    for ch in value.chars() {
        match ch {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            other => write!(f, "{other}")?,
        }
    }
    write!(f, "'")
}

/// Keys that can be written without quotes inside `array{...}`.
fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
