//! Entity definitions for the dialogue graph.

mod character;
mod condition;
mod lines;

pub use character::*;
pub use condition::*;
pub use lines::*;

use serde::{Deserialize, Serialize};

/// Reserved value in a condition field meaning "no condition".
pub const NO_CONDITION: &str = "NONE";

/// Returns true for values that never refer to another entity.
///
/// Both the empty string and [`NO_CONDITION`] are treated as always satisfied.
pub fn is_sentinel(value: &str) -> bool {
    value.is_empty() || value == NO_CONDITION
}

/// The collections that make up a dialogue graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Categories,
    Characters,
    Conditions,
    Dialogue,
    Responses,
}

impl Collection {
    /// The four keyed collections, in store order.
    pub const KEYED: [Collection; 4] = [
        Collection::Characters,
        Collection::Conditions,
        Collection::Dialogue,
        Collection::Responses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Characters => "characters",
            Collection::Conditions => "conditions",
            Collection::Dialogue => "dialogue",
            Collection::Responses => "responses",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record stored in one of the keyed collections.
///
/// Every entity is keyed by its `name`. The field accessors expose the
/// record's top-level string fields by their serialized names so that
/// reference rewriting can work across entity types.
pub trait Entity: Clone {
    /// The collection this entity lives in.
    const KIND: Collection;

    /// The entity's key.
    fn name(&self) -> &str;

    /// Every top-level string field, including `name`.
    fn scalar_fields_mut(&mut self) -> Vec<&mut String>;

    /// Read a string field by its serialized name.
    fn field(&self, field: &str) -> Option<&str>;

    /// Mutable access to a string field by its serialized name.
    fn field_mut(&mut self, field: &str) -> Option<&mut String>;
}
