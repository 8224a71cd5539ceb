use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Queue message driving the sync chain. The offset is transported as a
/// string to match the upstream message schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetMessage {
    pub offset: String,
}

impl OffsetMessage {
    pub fn new(offset: u64) -> Self {
        Self {
            offset: offset.to_string(),
        }
    }

    pub fn parse_offset(&self) -> Result<u64, SyncError> {
        self.offset.trim().parse::<u64>().map_err(|_| {
            SyncError::MalformedMessage(format!("offset is not numeric: '{}'", self.offset))
        })
    }
}

/// Parses a raw delivery payload into a catalog offset.
pub fn parse_offset_payload(payload: &[u8]) -> Result<u64, SyncError> {
    let message = serde_json::from_slice::<OffsetMessage>(payload)
        .map_err(|e| SyncError::MalformedMessage(format!("invalid offset message: {}", e)))?;

    message.parse_offset()
}

/// Envelope for deliveries routed to the failed queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqMessage {
    pub payload: String,
    pub failure_reason: String,
    pub failed_at: String,
}
