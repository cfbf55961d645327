//! Config file loading
//!
//! Files are layered with figment so later files override earlier ones.

use crate::error::{Result, TextconfError};
use figment::providers::{Format, Json, Toml, Yaml};
use figment::Figment;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "toml" => Ok(FileFormat::Toml),
            "json" => Ok(FileFormat::Json),
            _ => Err(TextconfError::UnsupportedFormat { path: path.to_path_buf(), ext }),
        }
    }
}

/// Add one file to a figment chain.
fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        return Err(TextconfError::NotFound(path.to_path_buf()));
    }
    let figment = match FileFormat::from_path(path)? {
        FileFormat::Yaml => figment.merge(Yaml::file(path)),
        FileFormat::Toml => figment.merge(Toml::file(path)),
        FileFormat::Json => figment.merge(Json::file(path)),
    };
    Ok(figment)
}

/// Load and deep-merge config files in order.
///
/// Returns the merged value (always a mapping) and the path of the first file.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<(Value, Option<PathBuf>)> {
    let mut figment = Figment::new();
    for path in paths {
        tracing::debug!("loading config file {}", path.as_ref().display());
        figment = merge_file(figment, path.as_ref())?;
    }

    let value: Value = figment.extract()?;
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let source = paths.first().map(|p| p.as_ref().to_path_buf());
    Ok((value, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_yaml_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("run.yaml");
        fs::write(&path, "model:\n  name: mlp\n  hidden: 128\nseed: 7\n").expect("write");

        let (value, source) = load_files(&[&path]).expect("load");
        assert_eq!(value["model"]["hidden"], json!(128));
        assert_eq!(value["seed"], json!(7));
        assert_eq!(source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let tmp = TempDir::new().expect("tmp");
        let base = tmp.path().join("base.yaml");
        let exp = tmp.path().join("exp.toml");
        fs::write(&base, "optim:\n  lr: 0.1\n  momentum: 0.9\ntags: [a, b]\n").expect("write");
        fs::write(&exp, "tags = [\"c\"]\n[optim]\nlr = 0.01\n").expect("write");

        let (value, _) = load_files(&[&base, &exp]).expect("load");
        assert_eq!(value["optim"]["lr"], json!(0.01));
        assert_eq!(value["optim"]["momentum"], json!(0.9));
        assert_eq!(value["tags"], json!(["c"]));
    }

    #[test]
    fn loads_json_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("run.json");
        fs::write(&path, r#"{"batch_size": 32, "name": "x"}"#).expect("write");

        let (value, _) = load_files(&[&path]).expect("load");
        assert_eq!(value["batch_size"], json!(32));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().expect("tmp");
        let result = load_files(&[tmp.path().join("nope.yaml")]);
        assert!(matches!(result, Err(TextconfError::NotFound(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("run.ini");
        fs::write(&path, "a=1").expect("write");
        let result = load_files(&[&path]);
        assert!(matches!(result, Err(TextconfError::UnsupportedFormat { .. })));
    }

    #[test]
    fn no_files_yields_empty_mapping() {
        let (value, source) = load_files::<PathBuf>(&[]).expect("load");
        assert_eq!(value, json!({}));
        assert!(source.is_none());
    }
}
