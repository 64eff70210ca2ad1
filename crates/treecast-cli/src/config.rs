//! Locating and reading the mapper configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use treecast::{TreecastError, config::MapperConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TreecastError {
    fn from(err: ConfigError) -> Self {
        TreecastError::Config(err.to_string())
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Explicit,
    Local,
    System,
}

/// Configuration files to consider when none is given explicitly, most
/// specific first.
fn implicit_candidates() -> Vec<(Origin, PathBuf)> {
    let mut candidates = vec![(Origin::Local, PathBuf::from("treecast/config.toml"))];
    match ProjectDirs::from("com", "treecast", "treecast") {
        Some(dirs) => candidates.push((Origin::System, dirs.config_dir().join("config.toml"))),
        None => debug!("No platform configuration directory"),
    }
    candidates
}

/// Load the mapper configuration.
///
/// An explicit path must exist. Otherwise `treecast/config.toml` and then
/// `config.toml` in the platform configuration directory are used if
/// present, and the defaults if neither is.
///
/// # Errors
///
/// Returns [`TreecastError::Config`] if the explicit file is missing or the
/// selected file is not valid TOML for [`MapperConfig`].
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<MapperConfig, TreecastError> {
    let selected = match explicit_path {
        Some(path) => Some((Origin::Explicit, path.as_ref().to_path_buf())),
        None => implicit_candidates()
            .into_iter()
            .find(|(_, path)| path.exists()),
    };

    let Some((origin, path)) = selected else {
        debug!("Using default configuration");
        return Ok(MapperConfig::default());
    };
    if !path.exists() {
        return Err(ConfigError::MissingFile(path).into());
    }

    info!(path = path.display().to_string(), origin:? = origin; "Loading configuration");
    parse_config(&fs::read_to_string(&path)?)
}

fn parse_config(content: &str) -> Result<MapperConfig, TreecastError> {
    Ok(toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?)
}
