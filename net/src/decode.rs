//! Turn complete record spans into typed [`Event`]s.

use serde_json::Value;

use crate::DecodeError;

/// JSON pointer to the author's display name in a status record.
pub const ACTOR_POINTER: &str = "/user/name";
/// JSON pointer to the status text.
pub const BODY_POINTER: &str = "/text";

/// A decoded stream record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Who posted the record.
    pub actor: String,
    /// What they posted.
    pub body: String,
}

/// Schema check mapping a record onto an [`Event`].
///
/// The actor and body are located by JSON pointer so feeds with a different
/// layout can be read without a new decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoder {
    actor: String,
    body: String,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::with_fields(ACTOR_POINTER, BODY_POINTER)
    }
}

impl Decoder {
    pub fn with_fields(actor: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            body: body.into(),
        }
    }

    /// Parse `span` and extract the required fields.
    pub fn decode(&self, span: &[u8]) -> Result<Event, DecodeError> {
        let value: Value = serde_json::from_slice(span)?;
        Ok(Event {
            actor: required(&value, &self.actor)?,
            body: required(&value, &self.body)?,
        })
    }
}

/// Decode `span` using the status schema.
///
/// ```
/// let event = net::decode(br#"{"user":{"name":"Alice"},"text":"hi"}"#).unwrap();
/// assert_eq!(event.actor, "Alice");
/// ```
pub fn decode(span: &[u8]) -> Result<Event, DecodeError> {
    Decoder::default().decode(span)
}

fn required(value: &Value, pointer: &str) -> Result<String, DecodeError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| DecodeError::MissingField(pointer.to_string()))
}
