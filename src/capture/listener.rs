use log::{info, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{events::SignalEvent, payload::IrPayload};

use super::CaptureController;

/// Subscription to the host bus feeding IR signals into the capture controller.
pub struct SignalListener {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl SignalListener {
    /// Starts consuming `signals`, handing every event of type `signal_event_type` to
    /// the controller one at a time.
    pub fn spawn(
        controller: CaptureController,
        signals: broadcast::Receiver<SignalEvent>,
        signal_event_type: String,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(listen(
            controller,
            signals,
            signal_event_type,
            cancel_token.clone(),
        ));

        Self {
            handle: Some(handle),
            cancel_token,
        }
    }

    pub async fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!("Signal listener task failed to join: {err}");
            }
        }
    }
}

async fn listen(
    controller: CaptureController,
    mut signals: broadcast::Receiver<SignalEvent>,
    signal_event_type: String,
    cancel_token: CancellationToken,
) {
    info!("Listening for '{signal_event_type}' events");
    loop {
        tokio::select! {
            received = signals.recv() => match received {
                Ok(event) => {
                    if event.event_type != signal_event_type {
                        continue;
                    }
                    match IrPayload::from_value(event.data) {
                        Ok(payload) => {
                            controller.on_signal_received(payload).await;
                        }
                        Err(err) => warn!("Dropping undecodable IR signal: {err}"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Signal listener lagged, {skipped} events skipped");
                }
                Err(RecvError::Closed) => {
                    info!("Signal bus closed");
                    break;
                }
            },
            _ = cancel_token.cancelled() => {
                info!("Signal listener shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Database,
        events::{EventBus, Notification},
    };
    use serde_json::json;
    use std::sync::Arc;

    const SIGNAL_TYPE: &str = "esphome.hassbeam.ir_received";

    #[tokio::test]
    async fn test_matching_events_reach_the_controller() {
        let bus = Arc::new(EventBus::new());
        let db = Database::in_memory().unwrap();
        let controller = CaptureController::new(db.clone(), bus.clone());
        let mut notifications = bus.subscribe_notifications();
        let mut listener =
            SignalListener::spawn(controller.clone(), bus.subscribe_signals(), SIGNAL_TYPE.into());

        controller.begin_capture("tv", "power").await.unwrap();
        bus.fire(SignalEvent::new("state_changed", json!({"protocol": "NEC"})));
        bus.fire(SignalEvent::new(SIGNAL_TYPE, json!("not an object")));
        bus.fire(SignalEvent::new(SIGNAL_TYPE, json!({"protocol": "NEC", "command": "0x10"})));

        let notification = notifications.recv().await.unwrap();
        assert!(matches!(notification, Notification::CodeCaptured(ref o) if o.success));
        let stored = db.get_code("tv", "power").await.unwrap().unwrap();
        assert_eq!(stored.payload.fields()["command"], json!("0x10"));

        listener.stop().await;
    }
}
