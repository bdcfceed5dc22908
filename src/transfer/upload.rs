use serde_bytes::ByteBuf;
use uuid::Uuid;

use crate::protocol::transfer::{FileTransferPart, FileTransferStart};
use crate::protocol::Message;

/// Lazily chunked upload: yields the start message, then each part.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    component_id: String,
    transfer_uuid: String,
    filename: String,
    mime_type: String,
    data: Vec<u8>,
    chunk_bytes: usize,
    /// Next item: 0 is the start message, `n + 1` is part `n`.
    cursor: u64,
}

impl UploadPlan {
    /// Plan an upload from a GUI component under a fresh transfer id.
    #[must_use]
    pub fn new(
        component_id: &str,
        filename: &str,
        mime_type: &str,
        data: Vec<u8>,
        chunk_bytes: usize,
    ) -> Self {
        Self {
            component_id: component_id.to_owned(),
            transfer_uuid: Uuid::new_v4().to_string(),
            filename: filename.to_owned(),
            mime_type: mime_type.to_owned(),
            data,
            chunk_bytes: chunk_bytes.max(1),
            cursor: 0,
        }
    }

    /// Transfer id.
    #[must_use]
    pub fn transfer_uuid(&self) -> &str {
        &self.transfer_uuid
    }

    /// Uploaded file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Total bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Number of parts: the size divided by the chunk size, rounded up.
    #[must_use]
    pub fn part_count(&self) -> u64 {
        self.data.len().div_ceil(self.chunk_bytes) as u64
    }

    fn start_message(&self) -> FileTransferStart {
        FileTransferStart {
            source_component_id: Some(self.component_id.clone()),
            transfer_uuid: self.transfer_uuid.clone(),
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            part_count: self.part_count(),
            size_bytes: self.size_bytes(),
        }
    }

    fn part_message(&self, index: u64) -> FileTransferPart {
        let begin = index as usize * self.chunk_bytes;
        let end = (begin + self.chunk_bytes).min(self.data.len());
        FileTransferPart {
            source_component_id: Some(self.component_id.clone()),
            transfer_uuid: self.transfer_uuid.clone(),
            part: index,
            content: ByteBuf::from(self.data[begin..end].to_vec()),
        }
    }
}

impl Iterator for UploadPlan {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        let item = match self.cursor {
            0 => Message::FileTransferStart(self.start_message()),
            n if n <= self.part_count() => {
                Message::FileTransferPart(self.part_message(n - 1))
            }
            _ => return None,
        };
        self.cursor += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.part_count() + 1).saturating_sub(self.cursor) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_parts_cover_the_file() {
        let data: Vec<u8> = (0..=255).cycle().take(1300).collect();
        let plan = UploadPlan::new("upload", "a.bin", "application/octet-stream", data.clone(), 512);
        assert_eq!(plan.part_count(), 3);
        let messages: Vec<Message> = plan.collect();
        assert_eq!(messages.len(), 4);

        let Message::FileTransferStart(start) = &messages[0] else {
            panic!("first message must be the start");
        };
        assert_eq!(start.size_bytes, 1300);
        assert_eq!(start.part_count, 3);
        assert_eq!(start.source_component_id.as_deref(), Some("upload"));

        let mut joined = Vec::new();
        for (i, message) in messages[1..].iter().enumerate() {
            let Message::FileTransferPart(part) = message else {
                panic!("expected a part");
            };
            assert_eq!(part.part, i as u64);
            assert_eq!(part.transfer_uuid, start.transfer_uuid);
            joined.extend_from_slice(&part.content);
        }
        assert_eq!(joined, data);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let plan = UploadPlan::new("u", "b", "x", vec![0; 1024], 512);
        assert_eq!(plan.part_count(), 2);
        assert_eq!(plan.count(), 3);
    }

    #[test]
    fn transfer_ids_are_unique() {
        let a = UploadPlan::new("u", "f", "x", vec![1], 512);
        let b = UploadPlan::new("u", "f", "x", vec![1], 512);
        assert_ne!(a.transfer_uuid(), b.transfer_uuid());
    }
}
