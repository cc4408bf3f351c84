use std::fs;
use std::path::{Path, PathBuf};

use super::core::FileConfig;
use crate::errors::{CompatError, Result};

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".compatgen.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse a config file body.
pub fn parse_config(contents: &str, origin: &Path) -> Result<FileConfig> {
    toml::from_str::<FileConfig>(contents).map_err(|e| {
        CompatError::config(format!("Failed to parse {}: {}", origin.display(), e))
    })
}

/// Load and parse the config file at `path`. A missing file is `Ok(None)`.
pub(crate) fn try_load_config_from_path(path: &Path) -> Result<Option<FileConfig>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(path, &e);
            return Ok(None);
        }
    };

    let config = parse_config(&contents, path)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

/// Only log actual read failures, not "file not found".
fn handle_read_error(path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!("Failed to read config file {}: {}", path.display(), error);
    }
}

/// `start` followed by its parents, at most `max_depth` directories in total.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn discover_config(start: PathBuf) -> Result<FileConfig> {
    for dir in directory_ancestors(start, MAX_TRAVERSAL_DEPTH + 1) {
        if let Some(config) = try_load_config_from_path(&dir.join(CONFIG_FILE_NAME))? {
            return Ok(config);
        }
    }
    log::debug!(
        "No {} found after checking {} directories. Using defaults.",
        CONFIG_FILE_NAME,
        MAX_TRAVERSAL_DEPTH + 1
    );
    Ok(FileConfig::default())
}

/// Load the explicit config file if given, otherwise search upward from the
/// current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path).map_err(|e| {
            CompatError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = parse_config(&contents, path)?;
        log::debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    match std::env::current_dir() {
        Ok(current) => discover_config(current),
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using defaults.", e);
            Ok(FileConfig::default())
        }
    }
}
