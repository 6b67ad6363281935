//! Operation boundary: every exposed operation validates its input, logs with the names
//! the caller used, and publishes its outcome on the bus.

use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    capture::{CaptureController, SignalListener},
    db::{CodeFilter, Database, DeletedCode, StoredCode},
    error::{Error, Result},
    events::{CodeOutcome, DeleteOutcome, EventBus, Notification, Notifier},
    normalize::{normalize, required_name},
    payload::PayloadInput,
    replay::{ReplayOrchestrator, TransmitRequest, Transport},
    settings::Settings,
};

#[derive(Clone)]
pub struct IrService {
    db: Database,
    notifier: Arc<dyn Notifier>,
    capture: CaptureController,
    replay: ReplayOrchestrator,
    default_list_limit: u32,
}

impl IrService {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        transport: Arc<dyn Transport>,
        settings: &Settings,
    ) -> Self {
        Self {
            capture: CaptureController::new(db.clone(), notifier.clone()),
            replay: ReplayOrchestrator::new(
                db.clone(),
                transport,
                notifier.clone(),
                settings.default_destination.clone(),
            ),
            db,
            notifier,
            default_list_limit: settings.default_list_limit,
        }
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    /// Subscribes the capture controller to inbound signals on `bus`.
    pub fn listen(&self, bus: &EventBus, signal_event_type: &str) -> SignalListener {
        SignalListener::spawn(
            self.capture.clone(),
            bus.subscribe_signals(),
            signal_event_type.to_string(),
        )
    }

    pub async fn begin_capture(&self, device: &str, action: &str) -> Result<()> {
        self.capture.begin_capture(device, action).await
    }

    /// Stores a code directly, without waiting for a signal.
    pub async fn save(
        &self,
        device: &str,
        action: &str,
        payload: PayloadInput,
    ) -> Result<StoredCode> {
        let result = self.try_save(device, action, payload).await;

        let outcome = match &result {
            Ok(stored) => {
                info!(
                    "IR code saved successfully for {}.{} (normalized: {}.{})",
                    device.trim(),
                    action.trim(),
                    stored.device,
                    stored.action
                );
                CodeOutcome::succeeded(device.trim(), action.trim())
            }
            Err(err) => {
                error!("Failed to save IR code for '{device}.{action}': {err}");
                CodeOutcome::failed(device.trim(), action.trim(), err)
            }
        };
        self.notifier.publish(Notification::CodeSaved(outcome));

        result
    }

    async fn try_save(
        &self,
        device: &str,
        action: &str,
        payload: PayloadInput,
    ) -> Result<StoredCode> {
        let device = required_name(device, "Device")?;
        let action = required_name(action, "Action")?;
        let payload = payload.into_payload()?;
        self.db.create_named_code(device, action, &payload).await
    }

    /// Newest codes first. Blank filters are ignored; `limit` defaults to the configured
    /// list size.
    pub async fn list_codes(
        &self,
        device: Option<&str>,
        action: Option<&str>,
        limit: Option<u32>,
    ) -> Vec<StoredCode> {
        let device_key = device.map(normalize).filter(|key| !key.is_empty());
        let action_key = action.map(normalize).filter(|key| !key.is_empty());
        if device_key.is_some() || action_key.is_some() {
            info!(
                "Normalized search values - Original: '{}.{}' -> Normalized: '{}.{}'",
                device.unwrap_or("None"),
                action.unwrap_or("None"),
                device_key.as_deref().unwrap_or("None"),
                action_key.as_deref().unwrap_or("None"),
            );
        }

        let filter = CodeFilter {
            device: device_key,
            action: action_key,
            limit: limit.unwrap_or(self.default_list_limit),
        };
        let codes = self.db.list_codes(filter).await;

        info!("Retrieved {} IR codes", codes.len());
        self.notifier.publish(Notification::CodesRetrieved {
            codes: codes.clone(),
        });
        codes
    }

    pub async fn delete(&self, id: i64) -> Result<DeletedCode> {
        let result = match self.db.delete_code(id).await {
            Ok(Some(deleted)) => Ok(deleted),
            Ok(None) => Err(Error::NotFound(format!("No IR code found with ID {id}"))),
            Err(err) => Err(err),
        };

        let outcome = match &result {
            Ok(deleted) => {
                info!(
                    "IR code deleted successfully: ID {id} ({}.{})",
                    deleted.device, deleted.action
                );
                DeleteOutcome::succeeded(deleted)
            }
            Err(err @ Error::NotFound(_)) => {
                warn!("{err}");
                DeleteOutcome::failed(id, err)
            }
            Err(err) => {
                error!("Failed to delete IR code {id}: {err}");
                DeleteOutcome::failed(id, err)
            }
        };
        self.notifier.publish(Notification::CodeDeleted(outcome));

        result
    }

    pub async fn replay(
        &self,
        device: &str,
        action: &str,
        target_override: Option<&str>,
    ) -> Result<TransmitRequest> {
        self.replay.replay(device, action, target_override).await
    }
}
