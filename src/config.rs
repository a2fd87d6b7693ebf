//! Tracking configuration
//!
//! Selects the metadata and artifact backends. Configuration is plain JSON,
//! read from a string, a file, or the file named by [`CONFIG_ENV_VAR`]:
//!
//! ```json
//! {
//!   "metadata": { "kind": "sqlite", "path": "runs/metadata.db" },
//!   "artifacts": { "kind": "local", "root": "runs/models" }
//! }
//! ```
//!
//! Missing sections fall back to [`TrackingConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Environment variable holding the path of a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "TRUENO_MLOPS_CONFIG";

/// Default directory for on-disk state.
pub const DEFAULT_STATE_DIR: &str = ".trueno-mlops";

/// Where experiment metadata is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataBackend {
    /// Process-local maps; nothing survives the process.
    Memory,
    /// Embedded SQLite database file.
    Sqlite {
        /// Database file, created with its parent directories if missing.
        path: PathBuf,
    },
}

impl Default for MetadataBackend {
    fn default() -> Self {
        if cfg!(feature = "sqlite") {
            Self::Sqlite {
                path: Path::new(DEFAULT_STATE_DIR).join("metadata.db"),
            }
        } else {
            Self::Memory
        }
    }
}

/// Where model artifacts are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBackend {
    /// Directory on the local filesystem.
    Local {
        /// Repository root.
        root: PathBuf,
    },
    /// In-process object store; downloads are written below `download_dir`.
    Memory {
        /// Directory receiving downloaded artifacts.
        download_dir: PathBuf,
    },
}

impl Default for ArtifactBackend {
    fn default() -> Self {
        Self::Local {
            root: Path::new(DEFAULT_STATE_DIR).join("models"),
        }
    }
}

/// Backend selection for a tracking [`Context`](crate::Context).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Metadata store backend.
    pub metadata: MetadataBackend,
    /// Model repository backend.
    pub artifacts: ArtifactBackend,
}

impl TrackingConfig {
    /// Fully in-memory configuration; downloads go to `download_dir`.
    #[must_use]
    pub fn in_memory(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata: MetadataBackend::Memory,
            artifacts: ArtifactBackend::Memory {
                download_dir: download_dir.into(),
            },
        }
    }

    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON or unknown backend kinds.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a serialization
    /// error if it is not a valid configuration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "loaded tracking config");
        Ok(config)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or the defaults if unset.
    ///
    /// # Errors
    ///
    /// Same as [`TrackingConfig::from_file`] when the variable is set.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a path is not valid UTF-8.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = TrackingConfig::from_json_str(
            r#"{
                "metadata": { "kind": "sqlite", "path": "/tmp/m.db" },
                "artifacts": { "kind": "memory", "download_dir": "/tmp/dl" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.metadata,
            MetadataBackend::Sqlite {
                path: PathBuf::from("/tmp/m.db")
            }
        );
        assert_eq!(
            config.artifacts,
            ArtifactBackend::Memory {
                download_dir: PathBuf::from("/tmp/dl")
            }
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TrackingConfig::from_json_str(r#"{ "metadata": { "kind": "memory" } }"#).unwrap();
        assert_eq!(config.metadata, MetadataBackend::Memory);
        assert_eq!(config.artifacts, ArtifactBackend::default());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = TrackingConfig::from_json_str(r#"{ "metadata": { "kind": "postgres" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = TrackingConfig::in_memory("/tmp/downloads");
        let json = config.to_json_string().unwrap();
        assert_eq!(TrackingConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        std::fs::write(&path, r#"{ "artifacts": { "kind": "local", "root": "models" } }"#).unwrap();

        let config = TrackingConfig::from_file(&path).unwrap();
        assert_eq!(
            config.artifacts,
            ArtifactBackend::Local {
                root: PathBuf::from("models")
            }
        );
    }
}
