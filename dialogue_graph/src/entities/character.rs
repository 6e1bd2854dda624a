//! Character definitions.

use serde::{Deserialize, Serialize};

use super::{Collection, Dialogue, Entity};

/// A speaker in the dialogue tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Key of the dialogue line the character opens with.
    #[serde(default)]
    pub default: String,
}

impl Character {
    /// Create a character with no opening line.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            default: String::new(),
        }
    }

    /// Set the opening dialogue line.
    pub fn with_default(mut self, dialogue: impl Into<String>) -> Self {
        self.default = dialogue.into();
        self
    }

    /// Check whether the character has an opening line assigned.
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

impl Entity for Character {
    const KIND: Collection = Collection::Characters;

    fn name(&self) -> &str {
        &self.name
    }

    fn scalar_fields_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.name, &mut self.display_name, &mut self.default]
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "displayName" => Some(&self.display_name),
            "default" => Some(&self.default),
            _ => None,
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "displayName" => Some(&mut self.display_name),
            "default" => Some(&mut self.default),
            _ => None,
        }
    }
}

/// Key of the n-th dialogue line owned by a character (`DLG_<name><n>`).
pub fn dialogue_id(character: &str, n: usize) -> String {
    format!("DLG_{}{}", character, n)
}

/// Key of the n-th response authored for a character (`RES_<name><n>`).
pub fn response_id(character: &str, n: usize) -> String {
    format!("RES_{}{}", character, n)
}

/// Build a new character together with its opening dialogue line.
///
/// The character's `default` points at the returned line, which is keyed
/// `DLG_<name>1` and flagged as the default.
pub fn scaffold_character(
    name: impl Into<String>,
    display_name: impl Into<String>,
) -> (Character, Dialogue) {
    let name = name.into();
    let display_name = display_name.into();
    let opening = dialogue_id(&name, 1);

    let line = Dialogue::new(
        opening.clone(),
        name.clone(),
        format!(
            "Hey here's a first bit of dialogue for '{}' to say!",
            display_name
        ),
    )
    .with_default(true);

    let character = Character::new(name, display_name).with_default(opening);
    (character, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let character = Character::new("JEFF", "Jeff");
        assert_eq!(character.name, "JEFF");
        assert_eq!(character.display_name, "Jeff");
        assert!(!character.has_default());
    }

    #[test]
    fn test_scaffold_character() {
        let (character, line) = scaffold_character("JEFF", "Jeff");

        assert_eq!(character.default, "DLG_JEFF1");
        assert_eq!(line.name, "DLG_JEFF1");
        assert_eq!(line.character, "JEFF");
        assert!(line.default);
        assert!(line.dialogue.contains("'Jeff'"));
    }

    #[test]
    fn test_serialized_field_names() {
        let character = Character::new("JEFF", "Jeff").with_default("DLG_JEFF1");
        let json = serde_json::to_value(&character).unwrap();

        assert_eq!(json["displayName"], "Jeff");
        assert_eq!(json["default"], "DLG_JEFF1");
        assert!(json.get("display_name").is_none());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let parsed: Result<Character, _> =
            serde_json::from_str(r#"{"displayName": "Jeff", "default": ""}"#);
        assert!(parsed.is_err());

        let parsed: Character = serde_json::from_str(r#"{"name": "JEFF"}"#).unwrap();
        assert_eq!(parsed.display_name, "");
    }

    #[test]
    fn test_field_access() {
        let mut character = Character::new("JEFF", "Jeff");
        assert_eq!(character.field("displayName"), Some("Jeff"));
        assert_eq!(character.field("met"), None);

        *character.field_mut("default").unwrap() = "DLG_JEFF2".to_string();
        assert_eq!(character.default, "DLG_JEFF2");
    }
}
