//! Template file lookup
//!
//! A template name is tried as given first, then under each search root
//! (`root/subdir/name`, then `root/name`). Roots are the working directory,
//! configured template directories, and the directory of the config file the
//! object came from together with its parent.

use crate::domain::Settings;
use crate::error::{Result, TextconfError};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct TemplateLocator {
    roots: Vec<PathBuf>,
    subdir: Option<String>,
}

impl TemplateLocator {
    /// Locator searching only the current directory.
    pub fn new() -> Self {
        let mut locator = Self::default();
        if let Ok(cwd) = std::env::current_dir() {
            locator.roots.push(cwd);
        }
        locator
    }

    /// Locator for the given settings and config source file.
    pub fn from_settings(settings: &Settings, source: Option<&Path>) -> Self {
        let mut locator = Self::new();
        for dir in &settings.template_dirs {
            locator = locator.root(dir.clone());
        }
        if let Some(dir) = source.and_then(Path::parent) {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            locator = locator.root(dir.to_path_buf());
            let parent =
                dir.canonicalize().ok().and_then(|d| d.parent().map(Path::to_path_buf));
            if let Some(parent) = parent {
                locator = locator.root(parent);
            }
        }
        if let Some(subdir) = &settings.template_subdir {
            locator = locator.subdir(subdir.clone());
        }
        locator
    }

    /// Add a search root (duplicates are ignored).
    pub fn root(mut self, dir: PathBuf) -> Self {
        if !self.roots.contains(&dir) {
            self.roots.push(dir);
        }
        self
    }

    pub fn subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every path that `locate` would try, in order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut out = vec![PathBuf::from(name)];
        if Path::new(name).is_absolute() {
            return out;
        }
        for root in &self.roots {
            if let Some(subdir) = &self.subdir {
                out.push(root.join(subdir).join(name));
            }
            out.push(root.join(name));
        }
        out.dedup();
        out
    }

    pub fn locate(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(TextconfError::NoTemplate);
        }
        let candidates = self.candidates(name);
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                tracing::debug!("template '{}' found at {}", name, found.display());
                Ok(found.clone())
            }
            None => Err(TextconfError::TemplateNotFound {
                name: name.to_string(),
                searched: candidates,
            }),
        }
    }
}
