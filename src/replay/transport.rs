use async_trait::async_trait;
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

/// Everything a driver needs to emit one stored code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmitRequest {
    /// Device that emits the waveform.
    pub destination: String,
    pub dispatch_target: String,
    pub parameters: Map<String, Value>,
}

impl TransmitRequest {
    /// Name under which the destination registers this transmit operation,
    /// e.g. `hassbeam_send_nec`.
    pub fn service_name(&self) -> String {
        format!("{}_{}", self.destination, self.dispatch_target)
    }
}

/// Driver layer that turns transmit parameters into IR light.
///
/// Delivery is fire-and-forget: `Ok` means the request was handed over, not that the
/// target device reacted.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn transmit(&self, request: TransmitRequest) -> anyhow::Result<()>;
}

/// Transport for standalone runs: records the request in the log and nothing else.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn transmit(&self, request: TransmitRequest) -> anyhow::Result<()> {
        info!(
            "Transmit {} {}",
            request.service_name(),
            Value::Object(request.parameters)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_joins_destination_and_target() {
        let request = TransmitRequest {
            destination: "hassbeam".into(),
            dispatch_target: "send_nec".into(),
            parameters: Map::new(),
        };
        assert_eq!(request.service_name(), "hassbeam_send_nec");
    }
}
