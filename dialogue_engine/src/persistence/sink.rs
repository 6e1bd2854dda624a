//! File sinks for exported dialogue and the bootstrap loader that reads them back.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dialogue_graph::DialogueStore;
use tokio::fs;
use tracing::debug;

use super::{import, Artifact, ExportArtifacts, Manifest};
use crate::error::PersistError;

/// A destination that durably stores exported artifacts.
pub trait ExportSink: Send + Sync + 'static {
    /// Write one export, returning the paths written.
    fn write(
        &self,
        artifacts: ExportArtifacts,
    ) -> impl Future<Output = Result<Vec<PathBuf>, PersistError>> + Send;
}

/// Writes exports into a directory, optionally mirroring them into a second
/// directory read at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySink {
    output_dir: PathBuf,
    mirror_dir: Option<PathBuf>,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mirror_dir: None,
        }
    }

    /// Copy every written file into `mirror_dir` as well.
    pub fn with_mirror(mut self, mirror_dir: impl Into<PathBuf>) -> Self {
        self.mirror_dir = Some(mirror_dir.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mirror_dir(&self) -> Option<&Path> {
        self.mirror_dir.as_deref()
    }

    async fn write_all(&self, artifacts: &ExportArtifacts) -> Result<Vec<PathBuf>, PersistError> {
        let mut files = artifacts.render()?;
        files.push((
            Artifact::Manifest,
            serde_json::to_string_pretty(&Manifest::current())?,
        ));

        create_dir(&self.output_dir).await?;
        let mut written = Vec::with_capacity(files.len());
        for (artifact, text) in &files {
            let path = self.output_dir.join(artifact.file_name());
            fs::write(&path, text)
                .await
                .map_err(|source| PersistError::SinkWriteFailure {
                    path: path.clone(),
                    source,
                })?;
            written.push(path);
        }
        debug!(dir = %self.output_dir.display(), files = written.len(), "artifacts written");

        if let Some(mirror_dir) = &self.mirror_dir {
            mirror(&written, mirror_dir).await?;
            debug!(dir = %mirror_dir.display(), "artifacts mirrored");
        }

        Ok(written)
    }
}

impl ExportSink for DirectorySink {
    fn write(
        &self,
        artifacts: ExportArtifacts,
    ) -> impl Future<Output = Result<Vec<PathBuf>, PersistError>> + Send {
        async move { self.write_all(&artifacts).await }
    }
}

async fn create_dir(dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| PersistError::SinkWriteFailure {
            path: dir.to_path_buf(),
            source,
        })
}

async fn mirror(files: &[PathBuf], mirror_dir: &Path) -> Result<(), PersistError> {
    create_dir(mirror_dir).await?;
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = mirror_dir.join(name);
        fs::copy(file, &target)
            .await
            .map_err(|source| PersistError::SinkWriteFailure {
                path: target.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Load a store from a directory written by [`DirectorySink`].
///
/// The manifest is optional; when present its version must match.
pub async fn load_dir(dir: impl AsRef<Path>) -> Result<DialogueStore, PersistError> {
    let dir = dir.as_ref();

    if let Some(text) = read_optional(&dir.join(Artifact::Manifest.file_name())).await? {
        Manifest::parse(&text)?.check()?;
    }

    let mut texts = HashMap::new();
    for artifact in Artifact::DATA {
        if let Some(text) = read_optional(&dir.join(artifact.file_name())).await? {
            texts.insert(artifact, text);
        }
    }

    let store = import(ExportArtifacts::parse(&texts)?);
    debug!(
        dir = %dir.display(),
        characters = store.characters.len(),
        dialogue = store.dialogue.len(),
        responses = store.responses.len(),
        "store loaded"
    );
    Ok(store)
}

async fn read_optional(path: &Path) -> Result<Option<String>, PersistError> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
