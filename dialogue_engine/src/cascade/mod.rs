//! Rename cascade - rewrites every reference to a renamed key.
//!
//! Two strategies are available:
//!
//! - **Uniform**: one shallow pass over characters, conditions, dialogue and
//!   responses. Any entry keyed with the old identifier is re-keyed, and any
//!   top-level string field equal to it is overwritten, whatever that field
//!   means. For the record types in this crate that is:
//!   - characters: `name`, `displayName`, `default`
//!   - conditions: `name`
//!   - dialogue: `name`, `character`, `dialogue`
//!   - responses: `name`, `parent`, `next`, `category`, `condition`, `dialogue`
//! - **Schema**: driven by [`FOREIGN_KEYS`](dialogue_graph::FOREIGN_KEYS).
//!   Only the renamed collection is re-keyed and only fields declared to
//!   reference that collection are rewritten. Text that happens to equal the
//!   old key is left alone.
//!
//! Both return a new store and never touch the category sequence.

use dialogue_graph::{foreign_keys_into, Collection, DialogueStore, Entity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which rename strategy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    #[default]
    Uniform,
    Schema,
}

/// Rename `old` to `new` everywhere using the uniform strategy.
pub fn cascade(store: &DialogueStore, old: &str, new: &str) -> DialogueStore {
    if old == new {
        return store.clone();
    }

    DialogueStore {
        categories: store.categories.clone(),
        characters: rebuild(&store.characters, old, new, rewrite_all),
        conditions: rebuild(&store.conditions, old, new, rewrite_all),
        dialogue: rebuild(&store.dialogue, old, new, rewrite_all),
        responses: rebuild(&store.responses, old, new, rewrite_all),
    }
}

/// Rename a key of `target` using the given strategy.
pub fn cascade_in(
    store: &DialogueStore,
    target: Collection,
    old: &str,
    new: &str,
    mode: CascadeMode,
) -> DialogueStore {
    match mode {
        CascadeMode::Uniform => cascade(store, old, new),
        CascadeMode::Schema => schema_cascade(store, target, old, new),
    }
}

fn schema_cascade(
    store: &DialogueStore,
    target: Collection,
    old: &str,
    new: &str,
) -> DialogueStore {
    if old == new {
        return store.clone();
    }

    let mut next = store.clone();
    match target {
        Collection::Categories => {}
        Collection::Characters => {
            next.characters = rebuild(&store.characters, old, new, rewrite_name)
        }
        Collection::Conditions => {
            next.conditions = rebuild(&store.conditions, old, new, rewrite_name)
        }
        Collection::Dialogue => next.dialogue = rebuild(&store.dialogue, old, new, rewrite_name),
        Collection::Responses => {
            next.responses = rebuild(&store.responses, old, new, rewrite_name)
        }
    }

    for fk in foreign_keys_into(target) {
        match fk.collection {
            Collection::Categories => {}
            Collection::Characters => rewrite_field(&mut next.characters, fk.field, old, new),
            Collection::Conditions => rewrite_field(&mut next.conditions, fk.field, old, new),
            Collection::Dialogue => rewrite_field(&mut next.dialogue, fk.field, old, new),
            Collection::Responses => rewrite_field(&mut next.responses, fk.field, old, new),
        }
    }

    next
}

/// Copy a collection, re-keying `old` to `new` in place and letting
/// `rewrite` patch each record.
///
/// When `new` is already a key, the earlier position survives and the
/// later record wins.
fn rebuild<E: Entity>(
    map: &IndexMap<String, E>,
    old: &str,
    new: &str,
    rewrite: fn(&mut E, &str, &str),
) -> IndexMap<String, E> {
    let mut rebuilt = IndexMap::with_capacity(map.len());
    for (key, entity) in map {
        let key = if key == old {
            new.to_string()
        } else {
            key.clone()
        };
        let mut entity = entity.clone();
        rewrite(&mut entity, old, new);
        rebuilt.insert(key, entity);
    }
    rebuilt
}

fn rewrite_all<E: Entity>(entity: &mut E, old: &str, new: &str) {
    for field in entity.scalar_fields_mut() {
        if field.as_str() == old {
            *field = new.to_string();
        }
    }
}

fn rewrite_name<E: Entity>(entity: &mut E, old: &str, new: &str) {
    if let Some(name) = entity.field_mut("name") {
        if name.as_str() == old {
            *name = new.to_string();
        }
    }
}

fn rewrite_field<E: Entity>(map: &mut IndexMap<String, E>, field: &str, old: &str, new: &str) {
    for entity in map.values_mut() {
        if let Some(value) = entity.field_mut(field) {
            if value.as_str() == old {
                *value = new.to_string();
            }
        }
    }
}
