//! # Treecast Parser
//!
//! Parser for type descriptions such as `list<int>`,
//! `array{id: int, tags?: list<string>}` or `null|Money<float>`. This crate
//! turns a description into a [`treecast_core::types::Type`] in three steps:
//!
//! 1. **Tokenize** - Convert the description to tokens
//! 2. **Parse** - Build an unresolved syntax tree from the tokens
//! 3. **Resolve** - Bind names to keywords, templates and symbols
//!
//! ## Usage
//!
//! ```
//! # use std::sync::Arc;
//! # use treecast_core::reflection::{Symbol, SymbolSource};
//! # use treecast_parser::{BasicSpecification, TypeParser, TypeParserFactory};
//! struct NoSymbols;
//!
//! impl SymbolSource for NoSymbols {
//!     fn symbol(&self, _name: &str) -> Option<Symbol> {
//!         None
//!     }
//! }
//!
//! let factory = TypeParserFactory::new(Arc::new(NoSymbols));
//! let parser = factory.get(Arc::new(BasicSpecification));
//!
//! let ty = parser.parse("array<string, list<int>>").unwrap();
//! assert_eq!(ty.to_string(), "array<string, list<int>>");
//! ```

pub mod error;
mod lexer;
mod parser;
mod resolve;
mod span;
mod specification;
mod syntax;
mod tokens;

use std::{fmt, sync::Arc};

use dashmap::DashMap;
use log::{debug, trace};
use treecast_core::{reflection::SymbolSource, types::Type};

pub use error::ParseError;
pub use span::Span;
pub use specification::{BasicSpecification, Specification, TemplateSpecification};

/// Turns type descriptions into types.
pub trait TypeParser: Send + Sync {
    /// Parse a type description.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with one diagnostic per problem found.
    fn parse(&self, raw: &str) -> Result<Type, ParseError>;
}

/// The parser bound to one [`Specification`].
#[derive(Clone)]
pub struct LexingTypeParser {
    specification: Arc<dyn Specification>,
    symbols: Arc<dyn SymbolSource>,
}

impl LexingTypeParser {
    pub fn new(specification: Arc<dyn Specification>, symbols: Arc<dyn SymbolSource>) -> Self {
        Self {
            specification,
            symbols,
        }
    }

    pub fn specification(&self) -> &dyn Specification {
        self.specification.as_ref()
    }
}

impl fmt::Debug for LexingTypeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexingTypeParser")
            .field("specification", &self.specification)
            .finish_non_exhaustive()
    }
}

impl TypeParser for LexingTypeParser {
    fn parse(&self, raw: &str) -> Result<Type, ParseError> {
        trace!(raw = raw, specification = self.specification.signature(); "Parsing type description");

        let tokens = lexer::tokenize(raw)?;
        let expr = parser::build_type(&tokens)?;
        resolve::resolve(&expr, self.specification.as_ref(), self.symbols.as_ref())
    }
}

/// Parsed types shared by every parser of a [`TypeParserFactory`].
///
/// Keyed by specification signature and raw description. Only successful
/// parses are stored.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: DashMap<(String, String), Type>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Memoizes another parser on `(specification signature, description)`.
#[derive(Debug, Clone)]
pub struct CachedParser<P> {
    inner: P,
    signature: String,
    cache: Arc<ParseCache>,
}

impl<P: TypeParser> CachedParser<P> {
    pub fn new(inner: P, signature: String, cache: Arc<ParseCache>) -> Self {
        Self {
            inner,
            signature,
            cache,
        }
    }
}

impl<P: TypeParser> TypeParser for CachedParser<P> {
    fn parse(&self, raw: &str) -> Result<Type, ParseError> {
        let key = (self.signature.clone(), raw.to_string());
        if let Some(ty) = self.cache.entries.get(&key) {
            trace!(raw = raw; "Parse cache hit");
            return Ok(ty.clone());
        }

        let ty = self.inner.parse(raw)?;
        debug!(raw = raw, ty:% = ty; "Parsed type description");
        self.cache.entries.insert(key, ty.clone());
        Ok(ty)
    }
}

/// Creates parsers bound to a [`Specification`], all sharing one cache.
#[derive(Clone)]
pub struct TypeParserFactory {
    symbols: Arc<dyn SymbolSource>,
    cache: Arc<ParseCache>,
}

impl TypeParserFactory {
    pub fn new(symbols: Arc<dyn SymbolSource>) -> Self {
        Self {
            symbols,
            cache: Arc::new(ParseCache::new()),
        }
    }

    /// Get a parser for the given specification.
    pub fn get(&self, specification: Arc<dyn Specification>) -> CachedParser<LexingTypeParser> {
        let signature = specification.signature();
        CachedParser::new(
            LexingTypeParser::new(specification, Arc::clone(&self.symbols)),
            signature,
            Arc::clone(&self.cache),
        )
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }
}

impl fmt::Debug for TypeParserFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeParserFactory")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
