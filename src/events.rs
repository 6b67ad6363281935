//! In-process event bus: inbound IR signals and outbound operation outcomes.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::db::{DeletedCode, StoredCode};

pub const EVENT_PREFIX: &str = "irbeam";

const BUS_CAPACITY: usize = 64;

/// Raw event as the host bus delivers it. Only events whose type matches the configured
/// signal type are decoded into an IR payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl SignalEvent {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// Result of a capture, save or replay for one (device, action) pair, carrying the names
/// exactly as the caller supplied them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeOutcome {
    pub device: String,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CodeOutcome {
    pub fn succeeded(device: &str, action: &str) -> Self {
        Self {
            device: device.to_string(),
            action: action.to_string(),
            success: true,
            error: None,
        }
    }

    pub fn failed(device: &str, action: &str, error: impl ToString) -> Self {
        Self {
            device: device.to_string(),
            action: action.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub fn succeeded(code: &DeletedCode) -> Self {
        Self {
            id: code.id,
            device: Some(code.device.clone()),
            action: Some(code.action.clone()),
            success: true,
            error: None,
        }
    }

    pub fn failed(id: i64, error: impl ToString) -> Self {
        Self {
            id,
            device: None,
            action: None,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", content = "data")]
pub enum Notification {
    #[serde(rename = "irbeam_code_captured")]
    CodeCaptured(CodeOutcome),
    #[serde(rename = "irbeam_code_saved")]
    CodeSaved(CodeOutcome),
    #[serde(rename = "irbeam_code_deleted")]
    CodeDeleted(DeleteOutcome),
    #[serde(rename = "irbeam_code_sent")]
    CodeSent(CodeOutcome),
    #[serde(rename = "irbeam_codes_retrieved")]
    CodesRetrieved { codes: Vec<StoredCode> },
}

impl Notification {
    pub fn event_type(&self) -> String {
        let suffix = match self {
            Notification::CodeCaptured(_) => "code_captured",
            Notification::CodeSaved(_) => "code_saved",
            Notification::CodeDeleted(_) => "code_deleted",
            Notification::CodeSent(_) => "code_sent",
            Notification::CodesRetrieved { .. } => "codes_retrieved",
        };
        format!("{EVENT_PREFIX}_{suffix}")
    }
}

/// Publish side of the host bus.
pub trait Notifier: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Broadcast-channel bus used when the crate runs standalone.
#[derive(Clone)]
pub struct EventBus {
    signals: broadcast::Sender<SignalEvent>,
    notifications: broadcast::Sender<Notification>,
}

impl EventBus {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(BUS_CAPACITY);
        let (notifications, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            signals,
            notifications,
        }
    }

    /// Delivers an inbound signal to every subscriber. Signals fired while nobody
    /// listens are dropped, as on the host bus.
    pub fn fire(&self, event: SignalEvent) {
        if self.signals.send(event).is_err() {
            debug!("Signal fired with no listener attached");
        }
    }

    pub fn subscribe_signals(&self) -> broadcast::Receiver<SignalEvent> {
        self.signals.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for EventBus {
    fn publish(&self, notification: Notification) {
        debug!("Publishing {}", notification.event_type());
        let _ = self.notifications.send(notification);
    }
}
