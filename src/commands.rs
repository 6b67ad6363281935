//! JSON command surface over [`IrService`].
//!
//! Each command maps onto one exposed operation. Failures never escape as Rust errors:
//! they come back as a response with `success: false`, the operation's message and its
//! error kind.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    error::Error,
    events::{EventBus, SignalEvent},
    payload::PayloadInput,
    service::IrService,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    BeginCapture {
        #[serde(default)]
        device: String,
        #[serde(default)]
        action: String,
    },
    SaveIrCode {
        #[serde(default)]
        device: String,
        #[serde(default)]
        action: String,
        #[serde(default)]
        event_data: Option<PayloadInput>,
    },
    GetRecentCodes {
        #[serde(default)]
        device: Option<String>,
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    DeleteIrCode {
        #[serde(deserialize_with = "deserialize_id")]
        id: i64,
    },
    SendIrCode {
        #[serde(default)]
        device: String,
        #[serde(default)]
        action: String,
        #[serde(default)]
        target: Option<String>,
    },
    /// Injects an inbound event as if the host bus had delivered it.
    FireSignal {
        #[serde(default)]
        event_type: Option<String>,
        #[serde(default)]
        data: Value,
    },
}

/// Row ids arrive either as JSON numbers or as numeric strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id '{text}'"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl CommandResponse {
    fn ok(data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".into(), other);
                map
            }
        };
        Self {
            success: true,
            error: None,
            error_kind: None,
            data,
        }
    }

    fn failed(error: impl ToString, kind: &str) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(kind.to_string()),
            data: Map::new(),
        }
    }
}

impl From<Result<Value, Error>> for CommandResponse {
    fn from(result: Result<Value, Error>) -> Self {
        match result {
            Ok(data) => CommandResponse::ok(data),
            Err(err) => CommandResponse::failed(&err, err.kind()),
        }
    }
}

pub struct Dispatcher {
    service: IrService,
    bus: EventBus,
    signal_event_type: String,
}

impl Dispatcher {
    pub fn new(service: IrService, bus: EventBus, signal_event_type: impl Into<String>) -> Self {
        Self {
            service,
            bus,
            signal_event_type: signal_event_type.into(),
        }
    }

    /// Parses and runs one line of input.
    pub async fn handle_line(&self, line: &str) -> CommandResponse {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.dispatch(command).await,
            Err(err) => CommandResponse::failed(format!("Invalid command: {err}"), "invalid_command"),
        }
    }

    pub async fn dispatch(&self, command: Command) -> CommandResponse {
        self.run(command).await.into()
    }

    async fn run(&self, command: Command) -> Result<Value, Error> {
        match command {
            Command::BeginCapture { device, action } => {
                self.service.begin_capture(&device, &action).await?;
                let capture = self.service.capture();
                Ok(json!({
                    "status": capture.status().await,
                    "pending": capture.pending().await,
                }))
            }
            Command::SaveIrCode {
                device,
                action,
                event_data,
            } => {
                let payload = event_data.unwrap_or(PayloadInput::Other(Value::Null));
                let code = self.service.save(&device, &action, payload).await?;
                Ok(json!({ "code": code }))
            }
            Command::GetRecentCodes {
                device,
                action,
                limit,
            } => {
                let codes = self
                    .service
                    .list_codes(device.as_deref(), action.as_deref(), limit)
                    .await;
                Ok(json!({ "codes": codes }))
            }
            Command::DeleteIrCode { id } => {
                let deleted = self.service.delete(id).await?;
                Ok(json!({ "deleted": deleted }))
            }
            Command::SendIrCode {
                device,
                action,
                target,
            } => {
                let request = self
                    .service
                    .replay(&device, &action, target.as_deref())
                    .await?;
                Ok(json!({
                    "service": request.service_name(),
                    "parameters": request.parameters,
                }))
            }
            Command::FireSignal { event_type, data } => {
                let event_type = event_type.unwrap_or_else(|| self.signal_event_type.clone());
                self.bus.fire(SignalEvent::new(event_type, data));
                Ok(Value::Null)
            }
        }
    }
}
