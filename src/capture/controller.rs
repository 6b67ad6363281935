use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::{
    db::{Database, StoredCode},
    error::{Error, Result},
    events::{CodeOutcome, Notification, Notifier},
    normalize::required_name,
    payload::IrPayload,
};

use super::{CaptureState, CaptureStatus, PendingCapture};

/// What became of one inbound signal.
#[derive(Debug)]
pub enum SignalOutcome {
    /// Nothing was armed.
    Ignored,
    Stored(StoredCode),
    Rejected(Error),
}

/// Correlates "begin capture" requests with the next inbound IR signal.
#[derive(Clone)]
pub struct CaptureController {
    state: Arc<Mutex<CaptureState>>,
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl CaptureController {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState::new())),
            db,
            notifier,
        }
    }

    pub async fn status(&self) -> CaptureStatus {
        self.state.lock().await.status()
    }

    pub async fn pending(&self) -> Option<PendingCapture> {
        self.state.lock().await.pending().cloned()
    }

    /// Arms the controller for `device`/`action`. Returns immediately; the signal is
    /// handled whenever it arrives. A capture that was already pending is dropped.
    ///
    /// Invalid names are rejected and reported as a failed capture.
    pub async fn begin_capture(&self, device_raw: &str, action_raw: &str) -> Result<()> {
        let (device, action) = match required_name(device_raw, "Device")
            .and_then(|device| Ok((device, required_name(action_raw, "Action")?)))
        {
            Ok(names) => names,
            Err(err) => {
                error!("Cannot begin capture for '{device_raw}.{action_raw}': {err}");
                self.notifier.publish(Notification::CodeCaptured(CodeOutcome::failed(
                    device_raw.trim(),
                    action_raw.trim(),
                    &err,
                )));
                return Err(err);
            }
        };

        let replaced = self
            .state
            .lock()
            .await
            .arm(device.to_string(), action.to_string());

        match replaced {
            Some(previous) => info!(
                "Capture armed for {device}.{action}, replacing pending {}.{}",
                previous.device, previous.action
            ),
            None => info!("Capture armed for {device}.{action}"),
        }
        Ok(())
    }

    /// Handles one inbound signal.
    ///
    /// The pending slot is taken before the store is touched, so exactly one signal
    /// answers each `begin_capture`, whether or not the save succeeds.
    pub async fn on_signal_received(&self, payload: IrPayload) -> SignalOutcome {
        let pending = self.state.lock().await.take();
        let Some(PendingCapture { device, action }) = pending else {
            debug!(
                "Ignoring IR signal ({}), no capture pending",
                payload.protocol().unwrap_or("no protocol")
            );
            return SignalOutcome::Ignored;
        };

        match self.db.create_named_code(&device, &action, &payload).await {
            Ok(stored) => {
                info!(
                    "Captured IR code for {device}.{action} (id {}, protocol {})",
                    stored.id,
                    payload.protocol().unwrap_or("unknown")
                );
                self.notifier
                    .publish(Notification::CodeCaptured(CodeOutcome::succeeded(&device, &action)));
                SignalOutcome::Stored(stored)
            }
            Err(err) => {
                error!("Capture for {device}.{action} failed: {err}");
                self.notifier.publish(Notification::CodeCaptured(CodeOutcome::failed(
                    &device, &action, &err,
                )));
                SignalOutcome::Rejected(err)
            }
        }
    }
}
