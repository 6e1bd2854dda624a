use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// A named flag gating responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default)]
    pub met: bool,
}

impl Condition {
    pub fn new(name: impl Into<String>, met: bool) -> Self {
        Self {
            name: name.into(),
            met,
        }
    }
}

impl Entity for Condition {
    const KIND: Collection = Collection::Conditions;

    fn name(&self) -> &str {
        &self.name
    }

    fn scalar_fields_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.name]
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            _ => None,
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}
