//! Lex V2 wire types for the dialogue code hook.
//!
//! The inbound event and the `ElicitSlot`/`Close` envelopes mirror the Lex
//! V2 JSON shapes. Fields we do not interpret are carried through untouched
//! (`serde_json::Value` flatten) so the intent echo on elicitation stays
//! faithful to what Lex sent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::FulfillmentState;

/// Inbound code-hook event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHookEvent {
    pub session_state: SessionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub intent: Intent,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The oracle's current interpretation of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Option<Slot>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(default)]
    pub value: Option<SlotValue>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    #[serde(default)]
    pub interpreted_value: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Outbound code-hook response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LexResponse {
    pub session_state: ResponseSessionState,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSessionState {
    pub dialog_action: DialogAction,
    pub intent: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(rename = "slotToElicit", skip_serializing_if = "Option::is_none")]
    pub slot_to_elicit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: String,
    pub content: String,
}

impl Message {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self {
            content_type: "PlainText".to_string(),
            content: content.into(),
        }
    }
}

/// Ask the user for a missing slot, echoing the intent as Lex sent it.
pub fn elicit_slot(intent: &Intent, slot_to_elicit: &str, message: &str) -> LexResponse {
    let intent_echo = serde_json::to_value(intent).unwrap_or(Value::Null);
    LexResponse {
        session_state: ResponseSessionState {
            dialog_action: DialogAction {
                action_type: "ElicitSlot".to_string(),
                slot_to_elicit: Some(slot_to_elicit.to_string()),
            },
            intent: intent_echo,
        },
        messages: vec![Message::plain_text(message)],
    }
}

/// End the conversation.
pub fn close(intent_name: &str, state: FulfillmentState, message: &str) -> LexResponse {
    LexResponse {
        session_state: ResponseSessionState {
            dialog_action: DialogAction {
                action_type: "Close".to_string(),
                slot_to_elicit: None,
            },
            intent: serde_json::json!({
                "name": intent_name,
                "state": state.as_str(),
            }),
        },
        messages: vec![Message::plain_text(message)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elicit_slot_envelope_shape() {
        let intent: Intent = serde_json::from_value(serde_json::json!({
            "name": "DiningSuggestionsIntent",
            "state": "InProgress",
            "slots": { "location": null }
        }))
        .unwrap();

        let response = elicit_slot(&intent, "location", "What city?");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["sessionState"]["dialogAction"]["type"], "ElicitSlot");
        assert_eq!(
            json["sessionState"]["dialogAction"]["slotToElicit"],
            "location"
        );
        // The intent is echoed back with its undigested fields intact.
        assert_eq!(
            json["sessionState"]["intent"]["name"],
            "DiningSuggestionsIntent"
        );
        assert_eq!(json["sessionState"]["intent"]["state"], "InProgress");
        assert_eq!(json["messages"][0]["contentType"], "PlainText");
        assert_eq!(json["messages"][0]["content"], "What city?");
    }

    #[test]
    fn test_close_envelope_shape() {
        let response = close(
            "DiningSuggestionsIntent",
            FulfillmentState::Fulfilled,
            "All set.",
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["sessionState"]["dialogAction"]["type"], "Close");
        assert!(json["sessionState"]["dialogAction"]
            .get("slotToElicit")
            .is_none());
        assert_eq!(json["sessionState"]["intent"]["state"], "Fulfilled");
        assert_eq!(json["messages"][0]["content"], "All set.");
    }

    #[test]
    fn test_close_reports_failed_state() {
        let response = close(
            "DiningSuggestionsIntent",
            FulfillmentState::Failed,
            "Something went wrong.",
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["sessionState"]["intent"]["state"], "Failed");
    }

    #[test]
    fn test_event_parses_without_slots_key() {
        let event: CodeHookEvent = serde_json::from_value(serde_json::json!({
            "sessionState": { "intent": { "name": "GreetingIntent" } }
        }))
        .unwrap();

        assert_eq!(event.session_state.intent.name, "GreetingIntent");
        assert!(event.session_state.intent.slots.is_empty());
    }
}
