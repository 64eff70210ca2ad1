//! Command-line argument definitions for the Treecast CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document, the target type,
//! the schema declaring its classes, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Treecast mapper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON document
    #[arg(help = "Path to the input JSON file")]
    pub input: String,

    /// Type description the document is mapped onto, e.g. `list<User>`
    #[arg(short = 't', long = "type")]
    pub ty: String,

    /// Path to the schema file (TOML) declaring classes, interfaces and enums
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Path to the output JSON file; the mapped value is printed when unset
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
