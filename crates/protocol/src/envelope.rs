//! Message envelope
//!
//! Every text frame on the viewer socket is a JSON object of the shape
//! `{"event": <string>, "data": <json>}`. The envelope keeps `data` as a raw
//! JSON value so routing can happen before the payload type is known.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Event carrying a [`crate::FrameData`] snapshot.
pub const STATE_EVENT: &str = "state";

/// Wrapper for every message exchanged with the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Build an envelope from any serializable payload.
    pub fn wrap<T: Serialize>(event: impl Into<String>, data: &T) -> serde_json::Result<Self> {
        Ok(Self::new(event, serde_json::to_value(data)?))
    }

    /// Parse an envelope from a text frame.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode the payload into a concrete type.
    pub fn decode_data<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_state_envelope() {
        let env = Envelope::parse(r#"{"event":"state","data":{"npcs":[]}}"#).expect("parse");
        assert_eq!(env.event, STATE_EVENT);
        assert_eq!(env.data, json!({"npcs": []}));
    }

    #[test]
    fn test_missing_data_is_null() {
        let env = Envelope::parse(r#"{"event":"ping"}"#).expect("parse");
        assert_eq!(env.event, "ping");
        assert!(env.data.is_null());
    }

    #[test]
    fn test_rejects_missing_event() {
        assert!(Envelope::parse(r#"{"data":1}"#).is_err());
        assert!(Envelope::parse("not json").is_err());
        assert!(Envelope::parse(r#"{"event":7,"data":null}"#).is_err());
    }

    #[test]
    fn test_decode_state_payload() {
        let env = Envelope::parse(
            r#"{"event":"state","data":{"food":[{"pos":[1,2],"radius":3,"color":"green"}]}}"#,
        )
        .expect("parse");

        let frame: crate::FrameData = env.decode_data().expect("decode frame");
        assert!(frame.agent.is_none());
        assert!(frame.npcs.is_empty());
        assert_eq!(frame.food.len(), 1);
        assert_eq!(frame.food[0].color, "green");

        assert!(env.decode_data::<Vec<u32>>().is_err());
    }

    #[test]
    fn test_wrap_serializes_payload() {
        let env = Envelope::wrap("hello", &vec![1, 2, 3]).expect("wrap");
        let text = env.to_text().expect("serialize");
        assert_eq!(text, r#"{"event":"hello","data":[1,2,3]}"#);
    }
}
