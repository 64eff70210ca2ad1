//! CLI logic for the Treecast mapper.
//!
//! Maps a JSON document onto a type description, using the classes of a
//! schema file, and writes the mapped value as JSON.

pub mod error_adapter;
pub mod schema;

mod args;
mod config;

pub use args::Args;

use std::{fs, io, sync::Arc};

use log::info;
use serde_json::Value as JsonValue;

use treecast::{MapperBuilder, TreecastError, registry::ClassRegistry};

use schema::Schema;

/// Run the Treecast CLI application
///
/// Loads the configuration and schema, maps the input document onto
/// `args.ty` and writes the result to `args.output`, or to stdout when no
/// output path is given.
///
/// # Errors
///
/// Returns `TreecastError` for:
/// - File I/O errors and malformed input JSON
/// - Configuration and schema loading errors
/// - Type parsing errors
/// - Mapping errors
pub fn run(args: &Args) -> Result<(), TreecastError> {
    info!(input_path = args.input, ty = args.ty; "Processing document");

    let config = config::load_config(args.config.as_ref())?;
    let registry = match &args.schema {
        Some(path) => Schema::load(path)?.into_registry()?,
        None => ClassRegistry::new(),
    };

    let source = fs::read_to_string(&args.input)?;
    let input: JsonValue = serde_json::from_str(&source).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", args.input))
    })?;

    let mapper = register_transformers(MapperBuilder::new(Arc::new(registry)))
        .with_config(config)
        .build()?;
    let value = mapper.map(&args.ty, input)?;
    let rendered = serde_json::to_string_pretty(&value.to_json())?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered + "\n")?;
            info!(output_file = path; "Mapped value written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Transformers available to `transform` attributes of schema files.
fn register_transformers(builder: MapperBuilder) -> MapperBuilder {
    builder
        .transformer("trim", |value| Ok(map_string(value, |s| s.trim().to_string())))
        .transformer("lowercase", |value| Ok(map_string(value, |s| s.to_lowercase())))
        .transformer("uppercase", |value| Ok(map_string(value, |s| s.to_uppercase())))
}

fn map_string(value: JsonValue, f: impl FnOnce(&str) -> String) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(f(&s)),
        other => other,
    }
}
