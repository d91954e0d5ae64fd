//! Wire Types
//!
//! JSON shapes crossing the three boundaries: backend -> push service ->
//! worker (push payloads), page -> worker (command messages), and worker ->
//! backend (subscription rotation).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nimbus_platform::PushSubscription;

/// Structured push payload: `{title, body, icon?, image?, data?, actions?, tag?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<PayloadAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// An action button delivered with a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A push event's payload after boundary validation.
///
/// Anything that is not a JSON object with `title` and `body` falls back to
/// the raw variant; the worker never treats a malformed payload as an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    Structured(NotificationPayload),
    Raw(String),
}

impl PushMessage {
    /// Parse push bytes. Never fails.
    pub fn parse(data: &[u8]) -> Self {
        match serde_json::from_slice::<NotificationPayload>(data) {
            Ok(payload) => PushMessage::Structured(payload),
            Err(_) => PushMessage::Raw(String::from_utf8_lossy(data).into_owned()),
        }
    }
}

/// Command sent from a page to the worker: `{"type": "..."}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    SkipWaiting,
    ClearCache,
    /// Forward-compatible no-op; carries the unrecognized type tag
    Unknown(Option<String>),
}

impl WorkerCommand {
    /// Classify a command message by its `type` field
    pub fn parse(message: &Value) -> Self {
        match message.get("type").and_then(Value::as_str) {
            Some("SKIP_WAITING") => WorkerCommand::SkipWaiting,
            Some("CLEAR_CACHE") => WorkerCommand::ClearCache,
            Some(other) => WorkerCommand::Unknown(Some(other.to_string())),
            None => WorkerCommand::Unknown(None),
        }
    }
}

/// Body POSTed on unsubscribe/verify: `{"endpoint": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMessage {
    pub endpoint: String,
}

/// Body POSTed when the push service rotates a subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionChangeMessage {
    pub old_endpoint: Option<String>,
    pub new_subscription: PushSubscription,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_payload() {
        let message = PushMessage::parse(br#"{"title":"T","body":"B","tag":"news"}"#);
        match message {
            PushMessage::Structured(payload) => {
                assert_eq!(payload.title, "T");
                assert_eq!(payload.body, "B");
                assert_eq!(payload.tag.as_deref(), Some("news"));
                assert!(payload.icon.is_none());
            }
            PushMessage::Raw(_) => panic!("expected structured payload"),
        }
    }

    #[test]
    fn test_parse_falls_back_to_raw() {
        assert_eq!(
            PushMessage::parse(b"plain words"),
            PushMessage::Raw("plain words".to_string())
        );
        // Valid JSON missing required fields is still not a payload
        assert_eq!(
            PushMessage::parse(br#"{"title":"only"}"#),
            PushMessage::Raw(r#"{"title":"only"}"#.to_string())
        );
    }

    #[test]
    fn test_command_parse() {
        let skip = serde_json::json!({"type": "SKIP_WAITING"});
        let clear = serde_json::json!({"type": "CLEAR_CACHE"});
        let other = serde_json::json!({"type": "PREFETCH"});
        let none = serde_json::json!({"payload": 1});

        assert_eq!(WorkerCommand::parse(&skip), WorkerCommand::SkipWaiting);
        assert_eq!(WorkerCommand::parse(&clear), WorkerCommand::ClearCache);
        assert_eq!(
            WorkerCommand::parse(&other),
            WorkerCommand::Unknown(Some("PREFETCH".to_string()))
        );
        assert_eq!(WorkerCommand::parse(&none), WorkerCommand::Unknown(None));
    }

    #[test]
    fn test_payload_actions_roundtrip() {
        let json = br#"{"title":"T","body":"B","actions":[{"action":"open","title":"Open"}]}"#;
        match PushMessage::parse(json) {
            PushMessage::Structured(payload) => {
                assert_eq!(payload.actions.len(), 1);
                assert_eq!(payload.actions[0].action, "open");
            }
            PushMessage::Raw(_) => panic!("expected structured payload"),
        }
    }
}
