//! Writing rendered text to disk

use crate::domain::Settings;
use crate::error::{Result, TextconfError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    /// The file already had this content and was left untouched.
    Unchanged,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Created => write!(f, "created"),
            WriteOutcome::Updated => write!(f, "updated"),
            WriteOutcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<WriteOutcome> {
    let outcome = match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(WriteOutcome::Unchanged),
        Ok(_) => WriteOutcome::Updated,
        Err(_) => WriteOutcome::Created,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TextconfError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| TextconfError::io(path, e))?;
    tracing::info!("{} {}", outcome, path.display());
    Ok(outcome)
}

/// Whether `path` already holds exactly `content`.
pub fn check_output(path: &Path, content: &str) -> bool {
    fs::read_to_string(path).map(|existing| existing == content).unwrap_or(false)
}

/// Relative paths are placed under `output_dir` when one is configured.
pub fn resolve_output_path(settings: &Settings, path: &Path) -> PathBuf {
    match &settings.output_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
