//! IR code data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::IrPayload;

/// One row of `ir_codes`. `device` and `action` are canonical keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCode {
    pub id: i64,
    pub device: String,
    pub action: String,
    pub payload: IrPayload,
    pub created_at: DateTime<Utc>,
}

/// Optional, independently combinable filters for listing codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    pub device: Option<String>,
    pub action: Option<String>,
    pub limit: u32,
}

impl CodeFilter {
    pub fn newest(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Canonical key of a row removed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedCode {
    pub id: i64,
    pub device: String,
    pub action: String,
}
