//! Recording fakes for the bus and driver collaborators.

use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::{
    events::{Notification, Notifier},
    replay::{TransmitRequest, Transport},
};

#[derive(Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Drains everything published so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, notification: Notification) {
        self.published.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<TransmitRequest>>,
    failure: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<TransmitRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Makes every later transmit fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn transmit(&self, request: TransmitRequest) -> anyhow::Result<()> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}
