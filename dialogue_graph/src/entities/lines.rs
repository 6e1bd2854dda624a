//! Dialogue lines and the player responses that branch from them.

use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// Category assigned to freshly created responses.
pub const DEFAULT_CATEGORY: &str = "Generic";

/// A line spoken by a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub name: String,
    /// Key of the speaking character.
    #[serde(default)]
    pub character: String,
    /// The spoken text.
    #[serde(default)]
    pub dialogue: String,
    /// Whether this is the character's opening line.
    #[serde(default)]
    pub default: bool,
}

impl Dialogue {
    pub fn new(
        name: impl Into<String>,
        character: impl Into<String>,
        dialogue: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            dialogue: dialogue.into(),
            default: false,
        }
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

impl Entity for Dialogue {
    const KIND: Collection = Collection::Dialogue;

    fn name(&self) -> &str {
        &self.name
    }

    fn scalar_fields_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.name, &mut self.character, &mut self.dialogue]
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "character" => Some(&self.character),
            "dialogue" => Some(&self.dialogue),
            _ => None,
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "character" => Some(&mut self.character),
            "dialogue" => Some(&mut self.dialogue),
            _ => None,
        }
    }
}

/// A player response offered after a dialogue line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    /// Dialogue line this response is offered under.
    #[serde(default)]
    pub parent: String,
    /// Dialogue line the conversation moves to.
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub category: String,
    /// Gating condition; empty or `NONE` means always available.
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub dialogue: String,
}

impl Response {
    /// Create a response that loops back to its parent line.
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        let parent = parent.into();
        Self {
            name: name.into(),
            next: parent.clone(),
            parent,
            category: DEFAULT_CATEGORY.to_string(),
            condition: String::new(),
            dialogue: "Placeholder dialogue.".to_string(),
        }
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = next.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_dialogue(mut self, dialogue: impl Into<String>) -> Self {
        self.dialogue = dialogue.into();
        self
    }
}

impl Entity for Response {
    const KIND: Collection = Collection::Responses;

    fn name(&self) -> &str {
        &self.name
    }

    fn scalar_fields_mut(&mut self) -> Vec<&mut String> {
        vec![
            &mut self.name,
            &mut self.parent,
            &mut self.next,
            &mut self.category,
            &mut self.condition,
            &mut self.dialogue,
        ]
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "parent" => Some(&self.parent),
            "next" => Some(&self.next),
            "category" => Some(&self.category),
            "condition" => Some(&self.condition),
            "dialogue" => Some(&self.dialogue),
            _ => None,
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "parent" => Some(&mut self.parent),
            "next" => Some(&mut self.next),
            "category" => Some(&mut self.category),
            "condition" => Some(&mut self.condition),
            "dialogue" => Some(&mut self.dialogue),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response_defaults() {
        let response = Response::new("RES_JEFF1", "DLG_JEFF1");
        assert_eq!(response.parent, "DLG_JEFF1");
        assert_eq!(response.next, "DLG_JEFF1");
        assert_eq!(response.category, "Generic");
        assert!(response.condition.is_empty());
    }

    #[test]
    fn test_scalar_fields_cover_every_string() {
        let mut response = Response::new("R", "P")
            .with_next("N")
            .with_category("C")
            .with_condition("K")
            .with_dialogue("T");

        let values: Vec<String> = response
            .scalar_fields_mut()
            .into_iter()
            .map(|f| f.clone())
            .collect();
        assert_eq!(values, vec!["R", "P", "N", "C", "K", "T"]);
    }

    #[test]
    fn test_dialogue_deserialize_defaults() {
        let line: Dialogue = serde_json::from_str(r#"{"name": "DLG_A1"}"#).unwrap();
        assert_eq!(line.name, "DLG_A1");
        assert!(!line.default);
        assert!(line.character.is_empty());
    }
}
