//! Foreign-key table: which entity fields name keys in other collections.

use serde::{Deserialize, Serialize};

use crate::entities::Collection;

/// A field that is expected to hold the key of another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Collection owning the field.
    pub collection: Collection,
    /// Serialized field name.
    pub field: &'static str,
    /// Collection whose keys the field refers to.
    pub target: Collection,
}

/// Every declared reference in the dialogue graph.
pub const FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey {
        collection: Collection::Characters,
        field: "default",
        target: Collection::Dialogue,
    },
    ForeignKey {
        collection: Collection::Dialogue,
        field: "character",
        target: Collection::Characters,
    },
    ForeignKey {
        collection: Collection::Responses,
        field: "parent",
        target: Collection::Dialogue,
    },
    ForeignKey {
        collection: Collection::Responses,
        field: "next",
        target: Collection::Dialogue,
    },
    ForeignKey {
        collection: Collection::Responses,
        field: "category",
        target: Collection::Categories,
    },
    ForeignKey {
        collection: Collection::Responses,
        field: "condition",
        target: Collection::Conditions,
    },
];

/// Foreign keys pointing into the given collection.
pub fn foreign_keys_into(target: Collection) -> impl Iterator<Item = &'static ForeignKey> {
    FOREIGN_KEYS.iter().filter(move |fk| fk.target == target)
}

/// One referencing field on one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub collection: Collection,
    pub key: String,
    pub field: String,
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}].{}", self.collection, self.key, self.field)
    }
}

/// A reference whose value names no existing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    pub from: EntityRef,
    pub target: Collection,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_into_dialogue() {
        let fields: Vec<_> = foreign_keys_into(Collection::Dialogue)
            .map(|fk| (fk.collection, fk.field))
            .collect();

        assert_eq!(
            fields,
            vec![
                (Collection::Characters, "default"),
                (Collection::Responses, "parent"),
                (Collection::Responses, "next"),
            ]
        );
    }

    #[test]
    fn test_nothing_points_at_responses() {
        assert_eq!(foreign_keys_into(Collection::Responses).count(), 0);
    }

    #[test]
    fn test_entity_ref_display() {
        let r = EntityRef {
            collection: Collection::Responses,
            key: "RES_JEFF1".to_string(),
            field: "parent".to_string(),
        };
        assert_eq!(r.to_string(), "responses[RES_JEFF1].parent");
    }
}
