//! IPC message values and their wire conversion.

use serde::{Deserialize, Serialize};

use crate::abi::{RawMessage, MESSAGE_CAPACITY};
use crate::error::{Error, Result};

/// A message exchanged with a kernel thread.
///
/// The payload is bounded by the wire format's fixed data field; oversized
/// payloads are rejected at construction rather than truncated on send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcMessage {
    pub msg_id: u32,
    /// Kernel uptime at which the message was stamped; zero until the
    /// kernel has seen it.
    pub timestamp_ms: u64,
    payload: Vec<u8>,
}

impl IpcMessage {
    /// Build a message, failing with [`Error::InvalidParameter`] when the
    /// payload exceeds [`MESSAGE_CAPACITY`].
    pub fn new(msg_id: u32, payload: impl Into<Vec<u8>>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MESSAGE_CAPACITY {
            return Err(Error::InvalidParameter);
        }
        Ok(Self {
            msg_id,
            timestamp_ms: 0,
            payload,
        })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload rendered as text, with invalid UTF-8 replaced.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub(crate) fn to_raw(&self) -> RawMessage {
        let mut raw = RawMessage {
            msg_id: self.msg_id,
            timestamp: self.timestamp_ms,
            ..RawMessage::default()
        };
        raw.data[..self.payload.len()].copy_from_slice(&self.payload);
        raw.data_size = self.payload.len() as u32;
        raw
    }

    /// Decode a kernel-written message. The reported size is clamped to the
    /// data field's capacity before any read.
    pub(crate) fn from_raw(raw: &RawMessage) -> Self {
        let len = (raw.data_size as usize).min(MESSAGE_CAPACITY);
        Self {
            msg_id: raw.msg_id,
            timestamp_ms: raw.timestamp,
            payload: raw.data[..len].to_vec(),
        }
    }
}
