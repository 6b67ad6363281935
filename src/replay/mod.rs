//! Replay: look up a stored code and hand its transmit parameters to the driver.

pub mod transport;

use std::sync::Arc;

use log::{error, info};

use crate::{
    db::Database,
    error::{Error, Result},
    events::{CodeOutcome, Notification, Notifier},
    normalize::{normalize, required_name},
    protocol::encode,
};

pub use transport::{LogTransport, Transport, TransmitRequest};

#[derive(Clone)]
pub struct ReplayOrchestrator {
    db: Database,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    default_destination: String,
}

impl ReplayOrchestrator {
    pub fn new(
        db: Database,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        default_destination: impl Into<String>,
    ) -> Self {
        Self {
            db,
            transport,
            notifier,
            default_destination: default_destination.into(),
        }
    }

    /// Sends the code stored for `device_raw`/`action_raw` and publishes the outcome.
    ///
    /// `target_override` picks another emitter than the configured default.
    pub async fn replay(
        &self,
        device_raw: &str,
        action_raw: &str,
        target_override: Option<&str>,
    ) -> Result<TransmitRequest> {
        let result = self
            .prepare_and_send(device_raw, action_raw, target_override)
            .await;

        let outcome = match &result {
            Ok(request) => {
                info!(
                    "Sent IR code {device_raw}.{action_raw} via {}",
                    request.service_name()
                );
                CodeOutcome::succeeded(device_raw, action_raw)
            }
            Err(err) => {
                error!("Failed to send IR code {device_raw}.{action_raw}: {err}");
                CodeOutcome::failed(device_raw, action_raw, err)
            }
        };
        self.notifier.publish(Notification::CodeSent(outcome));

        result
    }

    async fn prepare_and_send(
        &self,
        device_raw: &str,
        action_raw: &str,
        target_override: Option<&str>,
    ) -> Result<TransmitRequest> {
        let device_raw = required_name(device_raw, "Device")?;
        let action_raw = required_name(action_raw, "Action")?;
        let device = normalize(device_raw);
        let action = normalize(action_raw);

        let stored = self.db.get_code(&device, &action).await?.ok_or_else(|| {
            Error::NotFound(format!(
                "No IR code found for {device_raw}.{action_raw} (normalized: {device}.{action})"
            ))
        })?;

        let protocol = stored
            .payload
            .protocol()
            .ok_or_else(|| Error::MissingProtocol {
                device: device_raw.to_string(),
                action: action_raw.to_string(),
            })?;
        let encoded = encode(protocol, stored.payload.fields())?;

        let destination = target_override
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .unwrap_or(&self.default_destination);

        let request = TransmitRequest {
            destination: destination.to_string(),
            dispatch_target: encoded.dispatch_target.to_string(),
            parameters: encoded.parameters,
        };

        self.transport
            .transmit(request.clone())
            .await
            .map_err(|err| Error::Transport(format!("{err:#}")))?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        payload::IrPayload,
        test_support::{RecordingNotifier, RecordingTransport},
    };
    use serde_json::json;

    struct Fixture {
        replay: ReplayOrchestrator,
        db: Database,
        transport: Arc<RecordingTransport>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let db = Database::in_memory().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let replay = ReplayOrchestrator::new(
            db.clone(),
            transport.clone(),
            notifier.clone(),
            "hassbeam",
        );
        Fixture {
            replay,
            db,
            transport,
            notifier,
        }
    }

    async fn store(db: &Database, device: &str, action: &str, value: serde_json::Value) {
        db.create_code(device, action, &IrPayload::from_value(value).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_replay_encodes_and_transmits() {
        let f = fixture();
        store(
            &f.db,
            "living_room_tv",
            "power",
            json!({"protocol": "NEC", "address": "0x04", "command": "0x10"}),
        )
        .await;

        let request = f.replay.replay("Living Room TV", "Power", None).await.unwrap();
        assert_eq!(request.destination, "hassbeam");
        assert_eq!(request.dispatch_target, "send_nec");
        assert_eq!(request.parameters["address"], json!(4));
        assert_eq!(request.parameters["command"], json!(16));

        assert_eq!(f.transport.sent(), vec![request]);
        assert_eq!(
            f.notifier.take(),
            vec![Notification::CodeSent(CodeOutcome::succeeded(
                "Living Room TV",
                "Power"
            ))]
        );
    }

    #[tokio::test]
    async fn test_target_override() {
        let f = fixture();
        store(&f.db, "tv", "power", json!({"protocol": "Sony", "data": "0xA90"})).await;

        let request = f.replay.replay("tv", "power", Some("bedroom_beam")).await.unwrap();
        assert_eq!(request.service_name(), "bedroom_beam_send_sony");

        let request = f.replay.replay("tv", "power", Some("  ")).await.unwrap();
        assert_eq!(request.destination, "hassbeam");
    }

    #[tokio::test]
    async fn test_not_found_skips_transport() {
        let f = fixture();
        let err = f.replay.replay("ghost", "nope", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("ghost.nope"));
        assert!(f.transport.sent().is_empty());

        let published = f.notifier.take();
        assert_eq!(
            published,
            vec![Notification::CodeSent(CodeOutcome::failed(
                "ghost",
                "nope",
                &err
            ))]
        );
    }

    #[tokio::test]
    async fn test_missing_and_unsupported_protocols() {
        let f = fixture();
        store(&f.db, "tv", "power", json!({"address": "0x04"})).await;
        store(&f.db, "tv", "mute", json!({"protocol": "Morse", "data": "..."})).await;

        let err = f.replay.replay("TV", "Power", None).await.unwrap_err();
        assert_eq!(err.kind(), "missing_protocol");
        let err = f.replay.replay("TV", "Mute", None).await.unwrap_err();
        assert_eq!(err.kind(), "unsupported_protocol");
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_validation_and_transport_failures() {
        let f = fixture();
        let err = f.replay.replay("", "power", None).await.unwrap_err();
        assert_eq!(err.kind(), "validation");

        store(&f.db, "tv", "power", json!({"protocol": "NEC"})).await;
        f.transport.fail_with("device offline");
        let err = f.replay.replay("tv", "power", None).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(err.to_string().contains("device offline"));
    }
}
