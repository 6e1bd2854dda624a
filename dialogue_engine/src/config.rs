//! Editor configuration, read from TOML.
//!
//! ```toml
//! [engine]
//! duplicates = "reject"
//! deletes = "reject_referenced"
//! cascade = "schema"
//!
//! [persistence]
//! output_dir = "output"
//! mirror_dir = "client/src/output"
//!
//! [editor]
//! history_limit = 50
//! ```
//!
//! Every section and field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mutation::EngineConfig;

/// Where exports are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory receiving the artifacts.
    pub output_dir: PathBuf,

    /// Second directory every export is copied into. When set, it is also
    /// the directory read at start-up.
    pub mirror_dir: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            mirror_dir: None,
        }
    }
}

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of snapshots kept for undo.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { history_limit: 100 }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub engine: EngineConfig,
    pub persistence: PersistenceConfig,
    pub editor: SessionConfig,
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The directory a session starts from.
    pub fn bootstrap_dir(&self) -> &Path {
        self.persistence
            .mirror_dir
            .as_deref()
            .unwrap_or(&self.persistence.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::CascadeMode;
    use crate::mutation::{DeletePolicy, DuplicatePolicy};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();

        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.persistence.output_dir, PathBuf::from("output"));
        assert_eq!(config.editor.history_limit, 100);
        assert_eq!(config.bootstrap_dir(), Path::new("output"));
    }

    #[test]
    fn test_full_config() {
        let config = EditorConfig::from_toml_str(
            r#"
            [engine]
            duplicates = "reject"
            deletes = "reject_referenced"
            cascade = "schema"

            [persistence]
            output_dir = "build/output"
            mirror_dir = "client/src/output"

            [editor]
            history_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.engine.deletes, DeletePolicy::RejectReferenced);
        assert_eq!(config.engine.cascade, CascadeMode::Schema);
        assert_eq!(config.editor.history_limit, 5);
        assert_eq!(config.bootstrap_dir(), Path::new("client/src/output"));
    }

    #[test]
    fn test_partial_section() {
        let config = EditorConfig::from_toml_str("[engine]\ncascade = \"schema\"\n").unwrap();

        assert_eq!(config.engine.cascade, CascadeMode::Schema);
        assert_eq!(config.engine.duplicates, DuplicatePolicy::Overwrite);
        assert_eq!(config.persistence, PersistenceConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = EditorConfig::from_toml_str("[engine]\ncascade = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EditorConfig::load("/nonexistent/editor.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
