use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const PROTOCOL_FIELD: &str = "protocol";

/// Captured IR signal as stored in the `payload` column.
///
/// Always a JSON object. `protocol` selects the encoder; every other field is kept
/// verbatim, whatever its depth, so codes captured by newer firmware survive a round
/// trip through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IrPayload(Map<String, Value>);

impl IrPayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Decodes an inbound value, rejecting anything that is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::MalformedPayload(format!(
                "IR payload must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parses a payload handed over as JSON text.
    pub fn parse_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| Error::MalformedPayload(format!("Invalid JSON in event_data: {err}")))?;
        Self::from_value(value)
    }

    pub fn protocol(&self) -> Option<&str> {
        self.0.get(PROTOCOL_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.0)
            .map_err(|err| Error::MalformedPayload(format!("payload is not serializable: {err}")))
    }
}

/// Payload as accepted by the direct save operation: either already structured or
/// JSON text that still has to be decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayloadInput {
    Structured(Map<String, Value>),
    Text(String),
    Other(Value),
}

impl PayloadInput {
    /// Resolves the input into a non-empty payload.
    pub fn into_payload(self) -> Result<IrPayload> {
        let payload = match self {
            PayloadInput::Structured(fields) => IrPayload::new(fields),
            PayloadInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(Error::Validation("Event data is required".into()));
                }
                IrPayload::parse_str(&text)?
            }
            PayloadInput::Other(Value::Null) => {
                return Err(Error::Validation("Event data is required".into()));
            }
            PayloadInput::Other(other) => IrPayload::from_value(other)?,
        };

        if payload.is_empty() {
            return Err(Error::Validation("Event data is required".into()));
        }
        Ok(payload)
    }
}

impl From<IrPayload> for PayloadInput {
    fn from(payload: IrPayload) -> Self {
        PayloadInput::Structured(payload.0)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
