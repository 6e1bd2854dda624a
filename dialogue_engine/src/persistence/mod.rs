//! Persistence adapter - converts stores to and from the flat file set a game
//! consumes.
//!
//! A store is written as five independent JSON arrays:
//! - `categories.json`: category strings, sorted
//! - `characters.json`, `conditions.json`, `dialogue.json`, `responses.json`:
//!   the records of each collection in store order
//!
//! A `manifest.json` alongside them records the format version.

mod queue;
mod sink;

pub use queue::*;
pub use sink::*;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use dialogue_graph::{Character, Condition, Dialogue, DialogueStore, Entity, Response};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// The files making up an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    Categories,
    Characters,
    Conditions,
    Dialogue,
    Responses,
    Manifest,
}

impl Artifact {
    /// The five data files, in write order.
    pub const DATA: [Artifact; 5] = [
        Artifact::Categories,
        Artifact::Characters,
        Artifact::Conditions,
        Artifact::Dialogue,
        Artifact::Responses,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Artifact::Categories => "categories.json",
            Artifact::Characters => "characters.json",
            Artifact::Conditions => "conditions.json",
            Artifact::Dialogue => "dialogue.json",
            Artifact::Responses => "responses.json",
            Artifact::Manifest => "manifest.json",
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Format metadata written next to the data files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    /// Seconds since the Unix epoch.
    pub exported_at: u64,
    pub artifacts: Vec<String>,
}

impl Manifest {
    /// Describe an export happening now.
    pub fn current() -> Self {
        let exported_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            version: FORMAT_VERSION,
            exported_at,
            artifacts: Artifact::DATA
                .iter()
                .map(|a| a.file_name().to_string())
                .collect(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, PersistError> {
        serde_json::from_str(text).map_err(|err| PersistError::MalformedImportArtifact {
            artifact: Artifact::Manifest,
            reason: err.to_string(),
        })
    }

    /// Fail unless the manifest was written with this format version.
    pub fn check(&self) -> Result<(), PersistError> {
        if self.version != FORMAT_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// The flattened contents of a store, ready to be written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportArtifacts {
    pub categories: Vec<String>,
    pub characters: Vec<Character>,
    pub conditions: Vec<Condition>,
    pub dialogue: Vec<Dialogue>,
    pub responses: Vec<Response>,
}

impl ExportArtifacts {
    /// Render each data artifact as pretty-printed JSON.
    pub fn render(&self) -> Result<Vec<(Artifact, String)>, PersistError> {
        Ok(vec![
            (Artifact::Categories, to_json(&self.categories)?),
            (Artifact::Characters, to_json(&self.characters)?),
            (Artifact::Conditions, to_json(&self.conditions)?),
            (Artifact::Dialogue, to_json(&self.dialogue)?),
            (Artifact::Responses, to_json(&self.responses)?),
        ])
    }

    /// Parse the five data artifacts from their file contents.
    pub fn parse(texts: &HashMap<Artifact, String>) -> Result<Self, PersistError> {
        let text = |artifact: Artifact| {
            texts
                .get(&artifact)
                .map(String::as_str)
                .ok_or_else(|| PersistError::MalformedImportArtifact {
                    artifact,
                    reason: format!("{} is missing", artifact.file_name()),
                })
        };

        let categories = serde_json::from_str(text(Artifact::Categories)?).map_err(|err| {
            PersistError::MalformedImportArtifact {
                artifact: Artifact::Categories,
                reason: err.to_string(),
            }
        })?;

        Ok(Self {
            categories,
            characters: parse_records(Artifact::Characters, text(Artifact::Characters)?)?,
            conditions: parse_records(Artifact::Conditions, text(Artifact::Conditions)?)?,
            dialogue: parse_records(Artifact::Dialogue, text(Artifact::Dialogue)?)?,
            responses: parse_records(Artifact::Responses, text(Artifact::Responses)?)?,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, PersistError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Parse one entity artifact. A record without a `name` is malformed; an
/// empty name is a valid key.
fn parse_records<E: DeserializeOwned>(
    artifact: Artifact,
    text: &str,
) -> Result<Vec<E>, PersistError> {
    serde_json::from_str(text).map_err(|err| PersistError::MalformedImportArtifact {
        artifact,
        reason: err.to_string(),
    })
}

/// Flatten a store into its export artifacts.
///
/// Categories are sorted; every other collection keeps store order.
pub fn export(store: &DialogueStore) -> ExportArtifacts {
    let mut categories = store.categories.clone();
    categories.sort();

    ExportArtifacts {
        categories,
        characters: store.characters.values().cloned().collect(),
        conditions: store.conditions.values().cloned().collect(),
        dialogue: store.dialogue.values().cloned().collect(),
        responses: store.responses.values().cloned().collect(),
    }
}

/// Rebuild a store from its export artifacts.
///
/// Records are keyed by name; when a name repeats, the last record wins.
pub fn import(artifacts: ExportArtifacts) -> DialogueStore {
    DialogueStore {
        categories: artifacts.categories,
        characters: key_by_name(artifacts.characters),
        conditions: key_by_name(artifacts.conditions),
        dialogue: key_by_name(artifacts.dialogue),
        responses: key_by_name(artifacts.responses),
    }
}

fn key_by_name<E: Entity>(records: Vec<E>) -> IndexMap<String, E> {
    records
        .into_iter()
        .map(|record| (record.name().to_string(), record))
        .collect()
}
