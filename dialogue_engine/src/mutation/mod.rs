//! Mutation engine - the closed set of edits an author can make.
//!
//! [`MutationEngine::apply`] is a pure function from a borrowed store and an
//! [`Operation`] to a new store. The input snapshot is never modified, so a
//! rejected operation leaves the caller holding exactly what it had.

mod action;

pub use action::*;

use dialogue_graph::{
    is_sentinel, Character, Collection, Condition, Dialogue, DialogueStore, Entity, Response,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cascade::{cascade_in, CascadeMode};
use crate::error::EngineError;
use crate::persistence::{self, ExportArtifacts};

/// What to do when an add or rename targets a key that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace the existing record.
    #[default]
    Overwrite,
    /// Fail with [`EngineError::Conflict`].
    Reject,
}

/// What to do when a removed key is still referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove anyway and leave the references dangling.
    #[default]
    AllowDangling,
    /// Fail with [`EngineError::ReferentialIntegrityViolation`].
    RejectReferenced,
}

/// Configuration for the mutation engine.
///
/// The default reproduces the permissive behavior authors are used to:
/// silent overwrite, dangling deletes and the uniform cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub duplicates: DuplicatePolicy,
    pub deletes: DeletePolicy,
    pub cascade: CascadeMode,
}

/// An edit to the dialogue graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Prepend a category.
    AddCategory(String),
    /// Replace the first occurrence of `old` with `new`.
    EditCategory { old: String, new: String },
    /// Drop one occurrence of a category.
    RemoveCategory(String),

    AddCharacter(Character),
    EditCharacter {
        old_key: Option<String>,
        record: Character,
    },
    RemoveCharacter(String),

    AddCondition(Condition),
    EditCondition {
        old_key: Option<String>,
        record: Condition,
    },
    RemoveCondition(String),

    AddDialogue(Dialogue),
    /// Replace a dialogue line, renaming it everywhere if its key changed.
    EditDialogue {
        old_key: Option<String>,
        record: Dialogue,
    },
    RemoveDialogue(String),

    AddResponse(Response),
    /// Replace a response, renaming it everywhere if its key changed.
    EditResponse {
        old_key: Option<String>,
        record: Response,
    },
    RemoveResponse(String),

    /// Hand the current snapshot to the persistence sink.
    Export,
}

impl Operation {
    /// The wire tag of this operation.
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::AddCategory(_) => "addCategory",
            Operation::EditCategory { .. } => "editCategory",
            Operation::RemoveCategory(_) => "removeCategory",
            Operation::AddCharacter(_) => "addCharacter",
            Operation::EditCharacter { .. } => "editCharacter",
            Operation::RemoveCharacter(_) => "removeCharacter",
            Operation::AddCondition(_) => "addCondition",
            Operation::EditCondition { .. } => "editCondition",
            Operation::RemoveCondition(_) => "removeCondition",
            Operation::AddDialogue(_) => "addDialogue",
            Operation::EditDialogue { .. } => "editDialogue",
            Operation::RemoveDialogue(_) => "removeDialogue",
            Operation::AddResponse(_) => "addResponse",
            Operation::EditResponse { .. } => "editResponse",
            Operation::RemoveResponse(_) => "removeResponse",
            Operation::Export => "export",
        }
    }
}

/// A side effect requested by an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Artifacts rendered from the snapshot at the moment of the request.
    Export(ExportArtifacts),
}

/// The result of applying an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub store: DialogueStore,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(store: DialogueStore) -> Self {
        Self {
            store,
            effect: None,
        }
    }
}

/// Keyed entities the engine can add, edit and remove generically.
trait Stored: Entity + Sized {
    fn map(store: &DialogueStore) -> &IndexMap<String, Self>;
    fn map_mut(store: &mut DialogueStore) -> &mut IndexMap<String, Self>;
}

macro_rules! stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn map(store: &DialogueStore) -> &IndexMap<String, Self> {
                &store.$field
            }

            fn map_mut(store: &mut DialogueStore) -> &mut IndexMap<String, Self> {
                &mut store.$field
            }
        }
    };
}

stored!(Character, characters);
stored!(Condition, conditions);
stored!(Dialogue, dialogue);
stored!(Response, responses);

/// Applies operations to dialogue stores.
#[derive(Debug, Clone, Default)]
pub struct MutationEngine {
    config: EngineConfig,
}

impl MutationEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply an operation, producing the next snapshot.
    pub fn apply(&self, store: &DialogueStore, op: Operation) -> Result<Transition, EngineError> {
        let tag = op.tag();
        debug!(operation = tag, "applying operation");

        let result = self.dispatch(store, op);
        if let Err(err) = &result {
            warn!(operation = tag, error = %err, "operation rejected");
        }
        result
    }

    /// Decode a wire action and apply it.
    pub fn apply_action(
        &self,
        store: &DialogueStore,
        action: Action,
    ) -> Result<Transition, EngineError> {
        let op = Operation::try_from(action).map_err(|err| {
            warn!(error = %err, "action rejected");
            err
        })?;
        self.apply(store, op)
    }

    fn dispatch(&self, store: &DialogueStore, op: Operation) -> Result<Transition, EngineError> {
        match op {
            Operation::AddCategory(value) => self.add_category(store, value),
            Operation::EditCategory { old, new } => self.edit_category(store, old, new),
            Operation::RemoveCategory(value) => self.remove_category(store, value),

            Operation::AddCharacter(record) => self.add(store, record),
            Operation::EditCharacter { old_key, record } => self.edit(store, old_key, record),
            Operation::RemoveCharacter(key) => self.remove::<Character>(store, key),

            Operation::AddCondition(record) => self.add(store, record),
            Operation::EditCondition { old_key, record } => self.edit(store, old_key, record),
            Operation::RemoveCondition(key) => self.remove::<Condition>(store, key),

            Operation::AddDialogue(record) => self.add(store, record),
            Operation::EditDialogue { old_key, record } => self.edit(store, old_key, record),
            Operation::RemoveDialogue(key) => self.remove::<Dialogue>(store, key),

            Operation::AddResponse(record) => self.add(store, record),
            Operation::EditResponse { old_key, record } => self.edit(store, old_key, record),
            Operation::RemoveResponse(key) => self.remove::<Response>(store, key),

            Operation::Export => Ok(Transition {
                store: store.clone(),
                effect: Some(Effect::Export(persistence::export(store))),
            }),
        }
    }

    fn add_category(
        &self,
        store: &DialogueStore,
        value: String,
    ) -> Result<Transition, EngineError> {
        self.ensure_vacant(store, Collection::Categories, &value)?;

        let mut next = store.clone();
        next.categories.insert(0, value);
        Ok(Transition::to(next))
    }

    fn edit_category(
        &self,
        store: &DialogueStore,
        old: String,
        new: String,
    ) -> Result<Transition, EngineError> {
        if old != new {
            self.ensure_vacant(store, Collection::Categories, &new)?;
        }

        let mut next = match self.config.cascade {
            CascadeMode::Schema if !is_sentinel(&old) => {
                cascade_in(store, Collection::Categories, &old, &new, CascadeMode::Schema)
            }
            _ => store.clone(),
        };

        match next.categories.iter().position(|c| *c == old) {
            Some(index) => next.categories[index] = new,
            None => next.categories.push(new),
        }
        Ok(Transition::to(next))
    }

    fn remove_category(
        &self,
        store: &DialogueStore,
        value: String,
    ) -> Result<Transition, EngineError> {
        let Some(index) = store.categories.iter().position(|c| *c == value) else {
            return Ok(Transition::to(store.clone()));
        };

        // Another copy of the category keeps its references valid.
        let occurrences = store.categories.iter().filter(|c| **c == value).count();
        if occurrences == 1 {
            self.ensure_unreferenced(store, Collection::Categories, &value)?;
        }

        let mut next = store.clone();
        next.categories.remove(index);
        Ok(Transition::to(next))
    }

    fn add<E: Stored>(&self, store: &DialogueStore, record: E) -> Result<Transition, EngineError> {
        self.ensure_vacant(store, E::KIND, record.name())?;

        let mut next = store.clone();
        E::map_mut(&mut next).insert(record.name().to_string(), record);
        Ok(Transition::to(next))
    }

    fn edit<E: Stored>(
        &self,
        store: &DialogueStore,
        old_key: Option<String>,
        record: E,
    ) -> Result<Transition, EngineError> {
        // An empty or sentinel previous key means "not renamed".
        let mut next = match old_key.as_deref() {
            Some(old) if !is_sentinel(old) && old != record.name() => {
                self.ensure_vacant(store, E::KIND, record.name())?;
                debug!(collection = %E::KIND, old, new = record.name(), "renaming");
                cascade_in(store, E::KIND, old, record.name(), self.config.cascade)
            }
            _ => store.clone(),
        };

        E::map_mut(&mut next).insert(record.name().to_string(), record);
        Ok(Transition::to(next))
    }

    fn remove<E: Stored>(
        &self,
        store: &DialogueStore,
        key: String,
    ) -> Result<Transition, EngineError> {
        if E::map(store).contains_key(&key) {
            self.ensure_unreferenced(store, E::KIND, &key)?;
        }

        let mut next = store.clone();
        E::map_mut(&mut next).shift_remove(&key);
        Ok(Transition::to(next))
    }

    fn ensure_vacant(
        &self,
        store: &DialogueStore,
        collection: Collection,
        key: &str,
    ) -> Result<(), EngineError> {
        if self.config.duplicates == DuplicatePolicy::Reject && store.contains(collection, key) {
            return Err(EngineError::Conflict {
                collection,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_unreferenced(
        &self,
        store: &DialogueStore,
        collection: Collection,
        key: &str,
    ) -> Result<(), EngineError> {
        if self.config.deletes == DeletePolicy::AllowDangling {
            return Ok(());
        }

        let referenced_by = store.referrers(collection, key);
        if referenced_by.is_empty() {
            Ok(())
        } else {
            Err(EngineError::ReferentialIntegrityViolation {
                collection,
                key: key.to_string(),
                referenced_by,
            })
        }
    }
}
