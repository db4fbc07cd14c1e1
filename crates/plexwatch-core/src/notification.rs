//! Playback notification payloads and the wire shapes that carry them.
//!
//! The feed delivers notifications in two shapes: a direct notification
//! object (optionally batched under a `PlaySessionStateNotification`
//! array) and a legacy `NotificationContainer` wrapper. Both normalize to
//! a flat list of [`PlaybackNotification`]s. The container-level `type`
//! field is unreliable (often constant) and is ignored; the
//! per-notification `state` is what consumers key on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Playback state reported by the server for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    Buffering,
    /// Any state string this version does not recognize. Notifications in
    /// this state parse fine but are dropped at signal mapping.
    Unknown,
}

impl PlaybackState {
    /// Parse a state string, mapping anything unrecognized to `Unknown`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            "buffering" => Self::Buffering,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Buffering => "buffering",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for PlaybackState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlaybackState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str_lossy(&s))
    }
}

/// One normalized playback notification.
///
/// Only the session key and state are interpreted; everything else the
/// server sent (media keys, view offset, user identifiers) passes through
/// untouched in `extra` for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackNotification {
    #[serde(
        rename = "sessionKey",
        default,
        deserialize_with = "de_session_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_key: Option<String>,
    pub state: PlaybackState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Session keys arrive as strings from current servers and as bare numbers
// from some older ones.
fn de_session_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid session key: {other}"
        ))),
    }
}

#[derive(Deserialize)]
struct ContainerBody {
    #[serde(rename = "PlaySessionStateNotification", default)]
    sessions: Vec<PlaybackNotification>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Wrapped {
        #[serde(rename = "NotificationContainer")]
        container: ContainerBody,
    },
    Batch {
        #[serde(rename = "PlaySessionStateNotification")]
        sessions: Vec<PlaybackNotification>,
    },
    Single(PlaybackNotification),
}

/// Parse one event payload into a flat, order-preserving notification list.
pub fn parse_notifications(data: &str) -> Result<Vec<PlaybackNotification>, serde_json::Error> {
    let raw: RawPayload = serde_json::from_str(data)?;
    Ok(match raw {
        RawPayload::Wrapped { container } => container.sessions,
        RawPayload::Batch { sessions } => sessions,
        RawPayload::Single(notification) => vec![notification],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_payload() {
        let list = parse_notifications(r#"{"sessionKey":"7","state":"playing","viewOffset":1200}"#)
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].session_key.as_deref(), Some("7"));
        assert_eq!(list[0].state, PlaybackState::Playing);
        assert_eq!(list[0].extra["viewOffset"], 1200);
    }

    #[test]
    fn wrapped_container_preserves_order() {
        let payload = r#"{"NotificationContainer":{"type":"playing","size":3,
            "PlaySessionStateNotification":[
                {"sessionKey":"1","state":"playing"},
                {"sessionKey":"2","state":"paused"},
                {"sessionKey":"3","state":"stopped"}
            ]}}"#;
        let list = parse_notifications(payload).unwrap();
        let states: Vec<_> = list.iter().map(|n| n.state).collect();
        assert_eq!(
            states,
            vec![
                PlaybackState::Playing,
                PlaybackState::Paused,
                PlaybackState::Stopped
            ]
        );
    }

    #[test]
    fn container_type_is_ignored() {
        // The wrapper claims "playing" but the item itself says paused.
        let payload = r#"{"NotificationContainer":{"type":"playing",
            "PlaySessionStateNotification":[{"sessionKey":"4","state":"paused"}]}}"#;
        let list = parse_notifications(payload).unwrap();
        assert_eq!(list[0].state, PlaybackState::Paused);
    }

    #[test]
    fn bare_batch_without_wrapper() {
        let payload = r#"{"PlaySessionStateNotification":[
            {"sessionKey":"5","state":"buffering"},
            {"sessionKey":"6","state":"playing"}
        ]}"#;
        let list = parse_notifications(payload).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].state, PlaybackState::Buffering);
    }

    #[test]
    fn unrecognized_state_parses_as_unknown() {
        let list = parse_notifications(r#"{"sessionKey":"8","state":"transcoding"}"#).unwrap();
        assert_eq!(list[0].state, PlaybackState::Unknown);
    }

    #[test]
    fn numeric_session_key() {
        let list = parse_notifications(r#"{"sessionKey":23,"state":"playing"}"#).unwrap();
        assert_eq!(list[0].session_key.as_deref(), Some("23"));
    }

    #[test]
    fn missing_state_is_an_error() {
        assert!(parse_notifications(r#"{"sessionKey":"9"}"#).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_notifications("not json {").is_err());
    }

    #[test]
    fn extra_fields_round_trip() {
        let list =
            parse_notifications(r#"{"sessionKey":"7","state":"paused","ratingKey":"12345"}"#)
                .unwrap();
        let back = serde_json::to_value(&list[0]).unwrap();
        assert_eq!(back["sessionKey"], "7");
        assert_eq!(back["state"], "paused");
        assert_eq!(back["ratingKey"], "12345");
    }
}
