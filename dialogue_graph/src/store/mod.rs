//! The dialogue store - the central value holding a whole dialogue graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entities::{
    dialogue_id, is_sentinel, response_id, Character, Collection, Condition, Dialogue, Entity,
    Response,
};
use crate::references::{DanglingReference, EntityRef, ForeignKey, FOREIGN_KEYS};

/// A complete snapshot of the dialogue graph.
///
/// Keyed collections preserve insertion order, which is the order entities
/// are exported in. Snapshots are plain values: operations produce a new
/// store rather than changing one that someone else may still hold.
///
/// Equality compares the keyed collections as maps: two stores holding the
/// same entries in a different order are equal. Compare `keys()` when order
/// matters. Categories compare as a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogueStore {
    /// Response categories, most recently added first.
    pub categories: Vec<String>,

    pub characters: IndexMap<String, Character>,

    pub conditions: IndexMap<String, Condition>,

    pub dialogue: IndexMap<String, Dialogue>,

    pub responses: IndexMap<String, Response>,
}

impl DialogueStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key exists in a collection.
    pub fn contains(&self, collection: Collection, key: &str) -> bool {
        match collection {
            Collection::Categories => self.categories.iter().any(|c| c == key),
            Collection::Characters => self.characters.contains_key(key),
            Collection::Conditions => self.conditions.contains_key(key),
            Collection::Dialogue => self.dialogue.contains_key(key),
            Collection::Responses => self.responses.contains_key(key),
        }
    }

    /// Number of entries in a collection.
    pub fn collection_len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Categories => self.categories.len(),
            Collection::Characters => self.characters.len(),
            Collection::Conditions => self.conditions.len(),
            Collection::Dialogue => self.dialogue.len(),
            Collection::Responses => self.responses.len(),
        }
    }

    /// Check if every collection is empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && Collection::KEYED
                .iter()
                .all(|c| self.collection_len(*c) == 0)
    }

    /// Add a character, replacing any existing one with the same name.
    pub fn add_character(&mut self, character: Character) {
        self.characters.insert(character.name.clone(), character);
    }

    /// Add a condition, replacing any existing one with the same name.
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.insert(condition.name.clone(), condition);
    }

    /// Add a dialogue line, replacing any existing one with the same name.
    pub fn add_dialogue(&mut self, dialogue: Dialogue) {
        self.dialogue.insert(dialogue.name.clone(), dialogue);
    }

    /// Add a response, replacing any existing one with the same name.
    pub fn add_response(&mut self, response: Response) {
        self.responses.insert(response.name.clone(), response);
    }

    /// All dialogue lines spoken by a character, in store order.
    pub fn dialogue_for_character(&self, character: &str) -> Vec<&Dialogue> {
        self.dialogue
            .values()
            .filter(|d| d.character == character)
            .collect()
    }

    /// All responses offered under a dialogue line, in store order.
    pub fn responses_for(&self, dialogue: &str) -> Vec<&Response> {
        self.responses
            .values()
            .filter(|r| r.parent == dialogue)
            .collect()
    }

    /// The line a character opens with, if it exists.
    pub fn default_dialogue(&self, character: &str) -> Option<&Dialogue> {
        self.characters
            .get(character)
            .and_then(|c| self.dialogue.get(&c.default))
    }

    /// Whether a condition is satisfied.
    ///
    /// Sentinel values and unknown conditions count as met.
    pub fn condition_met(&self, condition: &str) -> bool {
        if is_sentinel(condition) {
            return true;
        }
        self.conditions
            .get(condition)
            .map(|c| c.met)
            .unwrap_or(true)
    }

    /// Key for the next dialogue line of a character.
    pub fn next_dialogue_id(&self, character: &str) -> String {
        dialogue_id(character, self.dialogue_for_character(character).len() + 1)
    }

    /// Key for the next response offered under a dialogue line.
    ///
    /// Responses are numbered per line and named after the line's speaker.
    /// Returns `None` when the line does not exist.
    pub fn next_response_id(&self, parent: &str) -> Option<String> {
        let line = self.dialogue.get(parent)?;
        Some(response_id(&line.character, self.responses_for(parent).len() + 1))
    }

    /// Every field referring to `key` in the `target` collection.
    ///
    /// Sentinel values never count as references.
    pub fn referrers(&self, target: Collection, key: &str) -> Vec<EntityRef> {
        if is_sentinel(key) {
            return Vec::new();
        }

        FOREIGN_KEYS
            .iter()
            .filter(|fk| fk.target == target)
            .flat_map(|fk| {
                self.foreign_values(fk)
                    .into_iter()
                    .filter(move |(_, value)| *value == key)
                    .map(move |(owner, _)| EntityRef {
                        collection: fk.collection,
                        key: owner.to_string(),
                        field: fk.field.to_string(),
                    })
            })
            .collect()
    }

    /// Every non-sentinel reference that names no existing entity.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        FOREIGN_KEYS
            .iter()
            .flat_map(|fk| {
                self.foreign_values(fk)
                    .into_iter()
                    .filter(move |(_, value)| {
                        !is_sentinel(value) && !self.contains(fk.target, value)
                    })
                    .map(move |(owner, value)| DanglingReference {
                        from: EntityRef {
                            collection: fk.collection,
                            key: owner.to_string(),
                            field: fk.field.to_string(),
                        },
                        target: fk.target,
                        value: value.to_string(),
                    })
            })
            .collect()
    }

    /// `(owner key, field value)` pairs for one foreign key.
    fn foreign_values(&self, fk: &ForeignKey) -> Vec<(&str, &str)> {
        match fk.collection {
            Collection::Categories => Vec::new(),
            Collection::Characters => field_values(&self.characters, fk.field),
            Collection::Conditions => field_values(&self.conditions, fk.field),
            Collection::Dialogue => field_values(&self.dialogue, fk.field),
            Collection::Responses => field_values(&self.responses, fk.field),
        }
    }
}

fn field_values<'a, E: Entity>(
    map: &'a IndexMap<String, E>,
    field: &str,
) -> Vec<(&'a str, &'a str)> {
    map.iter()
        .filter_map(|(key, entity)| entity.field(field).map(|value| (key.as_str(), value)))
        .collect()
}
