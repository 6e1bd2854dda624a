//! Proptest strategies shared by the unit tests.

use dialogue_graph::{Character, Condition, Dialogue, DialogueStore, Response};
use proptest::prelude::*;

/// A small pool of keys, including both sentinel values, so generated
/// stores collide and cross-reference often.
pub fn ident() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["A", "B", "C", "D", "NONE", ""]).prop_map(String::from)
}

pub fn arb_store() -> impl Strategy<Value = DialogueStore> {
    (
        prop::collection::vec(ident(), 0..4),
        prop::collection::vec((ident(), ident(), ident()), 0..4),
        prop::collection::vec((ident(), any::<bool>()), 0..4),
        prop::collection::vec((ident(), ident(), ident(), any::<bool>()), 0..4),
        prop::collection::vec(
            (ident(), ident(), ident(), ident(), ident(), ident()),
            0..4,
        ),
    )
        .prop_map(|(categories, characters, conditions, lines, responses)| {
            let mut store = DialogueStore::new();
            store.categories = categories;
            for (name, display_name, default) in characters {
                store.add_character(Character {
                    name,
                    display_name,
                    default,
                });
            }
            for (name, met) in conditions {
                store.add_condition(Condition { name, met });
            }
            for (name, character, dialogue, default) in lines {
                store.add_dialogue(Dialogue {
                    name,
                    character,
                    dialogue,
                    default,
                });
            }
            for (name, parent, next, category, condition, dialogue) in responses {
                store.add_response(Response {
                    name,
                    parent,
                    next,
                    category,
                    condition,
                    dialogue,
                });
            }
            store
        })
}
