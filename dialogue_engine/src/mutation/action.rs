//! Wire form of an operation: `{ "type": ..., "payload": ..., "edit": ... }`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Operation;
use crate::error::EngineError;

/// An operation as sent by an editing front end.
///
/// `edit` carries the previous key for edit operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            edit: None,
        }
    }

    pub fn with_edit(mut self, edit: impl Into<String>) -> Self {
        self.edit = Some(edit.into());
        self
    }
}

impl TryFrom<Action> for Operation {
    type Error = EngineError;

    fn try_from(action: Action) -> Result<Self, Self::Error> {
        let Action {
            kind,
            payload,
            edit,
        } = action;
        let tag = kind.as_str();

        let op = match tag {
            "addCategory" => Operation::AddCategory(parse(tag, payload)?),
            "editCategory" => Operation::EditCategory {
                old: edit.ok_or_else(|| missing_edit(tag))?,
                new: parse(tag, payload)?,
            },
            "removeCategory" => Operation::RemoveCategory(parse(tag, payload)?),

            "addCharacter" => Operation::AddCharacter(parse(tag, payload)?),
            "editCharacter" => Operation::EditCharacter {
                old_key: edit,
                record: parse(tag, payload)?,
            },
            "removeCharacter" => Operation::RemoveCharacter(parse_key(tag, payload)?),

            "addCondition" => Operation::AddCondition(parse(tag, payload)?),
            "editCondition" => Operation::EditCondition {
                old_key: edit,
                record: parse(tag, payload)?,
            },
            "removeCondition" => Operation::RemoveCondition(parse_key(tag, payload)?),

            "addDialogue" => Operation::AddDialogue(parse(tag, payload)?),
            "editDialogue" => Operation::EditDialogue {
                old_key: edit,
                record: parse(tag, payload)?,
            },
            "removeDialogue" => Operation::RemoveDialogue(parse_key(tag, payload)?),

            "addResponse" => Operation::AddResponse(parse(tag, payload)?),
            "editResponse" => Operation::EditResponse {
                old_key: edit,
                record: parse(tag, payload)?,
            },
            "removeResponse" => Operation::RemoveResponse(parse_key(tag, payload)?),

            "export" | "saveFiles" => Operation::Export,

            _ => {
                return Err(EngineError::UnknownOperation {
                    tag: tag.to_string(),
                })
            }
        };
        Ok(op)
    }
}

fn parse<T: DeserializeOwned>(tag: &str, payload: Value) -> Result<T, EngineError> {
    serde_json::from_value(payload).map_err(|source| EngineError::MalformedPayload {
        tag: tag.to_string(),
        source,
    })
}

/// Remove payloads name their target either directly or through a record.
fn parse_key(tag: &str, payload: Value) -> Result<String, EngineError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeyPayload {
        Key(String),
        Record { name: String },
    }

    parse(tag, payload).map(|key| match key {
        KeyPayload::Key(key) => key,
        KeyPayload::Record { name } => name,
    })
}

fn missing_edit(tag: &str) -> EngineError {
    EngineError::MalformedPayload {
        tag: tag.to_string(),
        source: serde_json::Error::custom("missing previous value in 'edit'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_graph::{Character, Response};
    use serde_json::json;

    fn decode(value: Value) -> Result<Operation, EngineError> {
        let action: Action = serde_json::from_value(value).unwrap();
        Operation::try_from(action)
    }

    #[test]
    fn test_decode_add_character() {
        let op = decode(json!({
            "type": "addCharacter",
            "payload": { "name": "JEFF", "displayName": "Jeff", "default": "DLG_JEFF1" }
        }))
        .unwrap();

        assert_eq!(
            op,
            Operation::AddCharacter(Character::new("JEFF", "Jeff").with_default("DLG_JEFF1"))
        );
    }

    #[test]
    fn test_decode_remove_by_record_or_key() {
        let by_record = decode(json!({
            "type": "removeResponse",
            "payload": { "name": "RES_JEFF1", "parent": "DLG_JEFF1" }
        }))
        .unwrap();
        let by_key = decode(json!({ "type": "removeResponse", "payload": "RES_JEFF1" })).unwrap();

        assert_eq!(by_record, Operation::RemoveResponse("RES_JEFF1".to_string()));
        assert_eq!(by_key, by_record);
    }

    #[test]
    fn test_decode_edit_category() {
        let op = decode(json!({ "type": "editCategory", "payload": "Lore", "edit": "Generic" }))
            .unwrap();
        assert_eq!(
            op,
            Operation::EditCategory {
                old: "Generic".to_string(),
                new: "Lore".to_string(),
            }
        );

        let err = decode(json!({ "type": "editCategory", "payload": "Lore" })).unwrap_err();
        assert!(matches!(err, EngineError::MalformedPayload { .. }));
    }

    #[test]
    fn test_decode_edit_response_without_previous_key() {
        let op = decode(json!({
            "type": "editResponse",
            "payload": { "name": "RES_JEFF1", "parent": "DLG_JEFF1", "next": "DLG_JEFF1" }
        }))
        .unwrap();

        match op {
            Operation::EditResponse { old_key, record } => {
                assert!(old_key.is_none());
                assert_eq!(record.name, "RES_JEFF1");
                assert_eq!(record.condition, "");
            }
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn test_decode_export_aliases() {
        assert_eq!(decode(json!({ "type": "export" })).unwrap(), Operation::Export);
        assert_eq!(decode(json!({ "type": "saveFiles" })).unwrap(), Operation::Export);
    }

    #[test]
    fn test_unknown_tag() {
        let err = decode(json!({ "type": "bogus", "payload": {} })).unwrap_err();
        assert!(matches!(err, EngineError::UnknownOperation { ref tag } if tag == "bogus"));
    }

    #[test]
    fn test_malformed_payload() {
        let err = decode(json!({ "type": "addResponse", "payload": { "parent": "DLG_JEFF1" } }))
            .unwrap_err();

        match err {
            EngineError::MalformedPayload { tag, .. } => assert_eq!(tag, "addResponse"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_action_serializes_like_the_wire() {
        let action = Action::new(
            "addResponse",
            serde_json::to_value(Response::new("RES_JEFF1", "DLG_JEFF1")).unwrap(),
        );
        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(value["type"], "addResponse");
        assert_eq!(value["payload"]["category"], "Generic");
        assert!(value.get("edit").is_none());

        let edited = action.with_edit("RES_OLD");
        assert_eq!(serde_json::to_value(&edited).unwrap()["edit"], "RES_OLD");
    }
}
