//! An editing session: one writer applying operations to the current
//! snapshot, with undo and queued exports.

use std::collections::VecDeque;

use dialogue_graph::DialogueStore;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::{EditorError, PersistError};
use crate::mutation::{Action, Effect, MutationEngine, Operation, Transition};
use crate::persistence::{self, load_dir, DirectorySink, ExportQueue, ExportTicket};

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Owns the current snapshot and everything needed to change it.
#[derive(Debug)]
pub struct Editor {
    engine: MutationEngine,
    current: DialogueStore,
    history: VecDeque<DialogueStore>,
    history_limit: usize,
    exports: ExportQueue,
}

impl Editor {
    pub fn new(engine: MutationEngine, store: DialogueStore, exports: ExportQueue) -> Self {
        Self {
            engine,
            current: store,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            exports,
        }
    }

    /// Keep at most `limit` snapshots for undo.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.history.truncate(limit);
        self
    }

    /// Build a session over `store` that exports to the configured directories.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &EditorConfig, store: DialogueStore) -> Self {
        let mut sink = DirectorySink::new(&config.persistence.output_dir);
        if let Some(mirror_dir) = &config.persistence.mirror_dir {
            sink = sink.with_mirror(mirror_dir);
        }

        Self::new(
            MutationEngine::new(config.engine),
            store,
            ExportQueue::spawn(sink),
        )
        .with_history_limit(config.editor.history_limit)
    }

    /// Start a session from the last export, or from an empty store when
    /// nothing has been exported yet.
    ///
    /// A directory that cannot be checked is an error, never an empty start.
    pub async fn bootstrap(config: &EditorConfig) -> Result<Self, EditorError> {
        let dir = config.bootstrap_dir();
        let exists = tokio::fs::try_exists(dir)
            .await
            .map_err(|source| PersistError::Read {
                path: dir.to_path_buf(),
                source,
            })?;

        let store = if exists {
            load_dir(dir).await?
        } else {
            info!(dir = %dir.display(), "no previous export, starting empty");
            DialogueStore::new()
        };

        Ok(Self::from_config(config, store))
    }

    /// The current snapshot.
    pub fn store(&self) -> &DialogueStore {
        &self.current
    }

    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    /// Apply an operation to the current snapshot.
    ///
    /// An export returns the ticket of the queued write. A failed operation
    /// leaves the session untouched.
    pub fn dispatch(&mut self, op: Operation) -> Result<Option<ExportTicket>, EditorError> {
        let Transition { store, effect } = self.engine.apply(&self.current, op)?;

        match effect {
            Some(Effect::Export(artifacts)) => {
                let ticket = self.exports.submit(artifacts)?;
                Ok(Some(ticket))
            }
            None => {
                self.commit(store);
                Ok(None)
            }
        }
    }

    /// Decode a wire action and dispatch it.
    pub fn dispatch_action(&mut self, action: Action) -> Result<Option<ExportTicket>, EditorError> {
        let op = Operation::try_from(action)?;
        self.dispatch(op)
    }

    /// Queue an export of the current snapshot.
    pub fn export(&self) -> Result<ExportTicket, EditorError> {
        Ok(self.exports.submit(persistence::export(&self.current))?)
    }

    /// Restore the snapshot before the last committed operation.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = previous;
                debug!(remaining = self.history.len(), "undo");
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn commit(&mut self, store: DialogueStore) {
        let previous = std::mem::replace(&mut self.current, store);
        if self.history_limit == 0 {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(previous);
    }
}
