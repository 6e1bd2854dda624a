//! Error types for the dialogue engine.
//!
//! Every failure is reported to the caller as a typed value; none of them
//! leave a half-applied snapshot behind.

use std::path::PathBuf;

use dialogue_graph::{Collection, EntityRef};
use thiserror::Error;

use crate::persistence::Artifact;

/// Errors produced while applying an operation to a store.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The operation tag is not one the engine knows.
    #[error("unknown operation: '{tag}'")]
    UnknownOperation { tag: String },

    /// The tag is known but its payload has the wrong shape.
    #[error("malformed payload for '{tag}': {source}")]
    MalformedPayload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    /// A key already exists and duplicates are rejected.
    #[error("{collection} already contains '{key}'")]
    Conflict { collection: Collection, key: String },

    /// A delete would leave references pointing at nothing.
    #[error(
        "cannot remove '{key}' from {collection}: referenced by {}",
        format_refs(.referenced_by)
    )]
    ReferentialIntegrityViolation {
        collection: Collection,
        key: String,
        referenced_by: Vec<EntityRef>,
    },
}

fn format_refs(refs: &[EntityRef]) -> String {
    refs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from exporting or importing the file representation.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Writing an artifact to the sink failed.
    #[error("failed to write {}: {source}", .path.display())]
    SinkWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an artifact failed for a reason other than its content.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact is missing, does not parse, or holds a record without a key.
    #[error("malformed {artifact} artifact: {reason}")]
    MalformedImportArtifact { artifact: Artifact, reason: String },

    /// The manifest was written by an incompatible format version.
    #[error("format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// Rendering an artifact to JSON failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The export worker is no longer running.
    #[error("export queue closed")]
    QueueClosed,
}

/// Errors from loading editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Any error surfaced by an editor session.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_violation_message() {
        let err = EngineError::ReferentialIntegrityViolation {
            collection: Collection::Characters,
            key: "JEFF".to_string(),
            referenced_by: vec![
                EntityRef {
                    collection: Collection::Dialogue,
                    key: "DLG_JEFF1".to_string(),
                    field: "character".to_string(),
                },
                EntityRef {
                    collection: Collection::Dialogue,
                    key: "DLG_JEFF2".to_string(),
                    field: "character".to_string(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "cannot remove 'JEFF' from characters: referenced by \
             dialogue[DLG_JEFF1].character, dialogue[DLG_JEFF2].character"
        );
    }

    #[test]
    fn test_unknown_operation_message() {
        let err = EngineError::UnknownOperation {
            tag: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "unknown operation: 'bogus'");
    }
}
