//! File transfer and render capture message shapes.
//!
//! Field names mirror the wire schema one-to-one.
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::MediaType;

/// Announces a chunked transfer in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransferStart {
    pub source_component_id: Option<String>,
    pub transfer_uuid: String,
    pub filename: String,
    pub mime_type: String,
    pub part_count: u64,
    pub size_bytes: u64,
}

/// One chunk of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransferPart {
    pub source_component_id: Option<String>,
    pub transfer_uuid: String,
    pub part: u64,
    pub content: ByteBuf,
}

/// Server report of upload progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransferPartAck {
    pub source_component_id: Option<String>,
    pub transfer_uuid: String,
    pub transferred_bytes: u64,
    pub total_bytes: u64,
}

/// Server request for a still of the current viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRenderRequestMessage {
    pub format: MediaType,
    pub height: u32,
    pub width: u32,
    /// JPEG quality, 0 to 100.
    pub quality: u8,
}

/// Encoded image answering a [`GetRenderRequestMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRenderResponseMessage {
    pub payload: ByteBuf,
}
