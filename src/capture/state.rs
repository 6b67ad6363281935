use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CaptureStatus {
    #[default]
    Idle,
    Armed,
}

/// The (device, action) the next inbound signal is attributed to, as the caller typed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingCapture {
    pub device: String,
    pub action: String,
}

/// Single pending-capture slot.
///
/// Arming replaces whatever was pending; there is no queue and no expiry.
#[derive(Debug, Clone, Default)]
pub struct CaptureState {
    pending: Option<PendingCapture>,
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CaptureStatus {
        match self.pending {
            Some(_) => CaptureStatus::Armed,
            None => CaptureStatus::Idle,
        }
    }

    pub fn pending(&self) -> Option<&PendingCapture> {
        self.pending.as_ref()
    }

    /// Installs a new pending capture and returns the one it replaced.
    pub fn arm(&mut self, device: String, action: String) -> Option<PendingCapture> {
        self.pending.replace(PendingCapture { device, action })
    }

    /// Consumes the pending capture, leaving the slot idle.
    pub fn take(&mut self) -> Option<PendingCapture> {
        self.pending.take()
    }
}
