use rustc_hash::FxHashMap;

use super::format_size;
use crate::protocol::transfer::{FileTransferPart, FileTransferStart};

/// Most bytes reserved up front for a transfer. Larger files grow as
/// their parts arrive.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Progress of one inbound transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Transfer id.
    pub transfer_uuid: String,
    /// File name announced by the server.
    pub filename: String,
    /// MIME type announced by the server.
    pub mime_type: String,
    /// Declared total size.
    pub size_bytes: u64,
    /// Bytes received so far.
    pub bytes_downloaded: u64,
    /// [`format_size`] of the declared total.
    pub display_size: String,
}

impl DownloadProgress {
    /// Received share of the declared total, in percent.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.size_bytes == 0 {
            return 100.0;
        }
        (100.0 * self.bytes_downloaded as f64 / self.size_bytes as f64).min(100.0)
    }

    /// Whether every declared byte has arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.bytes_downloaded >= self.size_bytes
    }
}

/// A fully reassembled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDownload {
    /// File name announced by the server.
    pub filename: String,
    /// MIME type announced by the server.
    pub mime_type: String,
    /// File contents.
    pub data: Vec<u8>,
}

/// What a transfer message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadUpdate {
    /// More bytes are expected.
    InProgress(DownloadProgress),
    /// The transfer finished; its state has been released.
    Complete {
        /// Final progress.
        progress: DownloadProgress,
        /// The assembled file.
        file: CompletedDownload,
    },
    /// The transfer broke its own declared shape and was dropped.
    Failed(DownloadProgress),
}

impl DownloadUpdate {
    /// Progress carried by either variant.
    #[must_use]
    pub fn progress(&self) -> &DownloadProgress {
        match self {
            Self::InProgress(progress)
            | Self::Complete { progress, .. }
            | Self::Failed(progress) => progress,
        }
    }
}

struct Assembly {
    progress: DownloadProgress,
    part_count: u64,
    next_part: u64,
    data: Vec<u8>,
}

impl Assembly {
    fn finish(self) -> DownloadUpdate {
        let file = CompletedDownload {
            filename: self.progress.filename.clone(),
            mime_type: self.progress.mime_type.clone(),
            data: self.data,
        };
        DownloadUpdate::Complete {
            progress: self.progress,
            file,
        }
    }
}

/// Reassembly state of every inbound transfer, keyed by transfer id.
#[derive(Default)]
pub struct Downloads {
    active: FxHashMap<String, Assembly>,
}

impl Downloads {
    /// No transfers in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transfers in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    /// Begin a transfer. A zero-byte file completes immediately; a
    /// non-empty one announced with no parts fails.
    pub fn start(&mut self, msg: &FileTransferStart) -> DownloadUpdate {
        log::debug!(
            "download {:?}: {} bytes in {} parts",
            msg.filename,
            msg.size_bytes,
            msg.part_count
        );
        let reserve = msg.size_bytes.min(MAX_PREALLOCATION);
        let assembly = Assembly {
            progress: DownloadProgress {
                transfer_uuid: msg.transfer_uuid.clone(),
                filename: msg.filename.clone(),
                mime_type: msg.mime_type.clone(),
                size_bytes: msg.size_bytes,
                bytes_downloaded: 0,
                display_size: format_size(msg.size_bytes),
            },
            part_count: msg.part_count,
            next_part: 0,
            data: Vec::with_capacity(usize::try_from(reserve).unwrap_or(0)),
        };
        if assembly.progress.is_complete() {
            return assembly.finish();
        }
        if msg.part_count == 0 {
            log::error!(
                "transfer {:?} declares {} bytes in zero parts; dropping it",
                msg.transfer_uuid,
                msg.size_bytes
            );
            if self.active.remove(&msg.transfer_uuid).is_some() {
                log::warn!("transfer {:?} restarted", msg.transfer_uuid);
            }
            return DownloadUpdate::Failed(assembly.progress);
        }
        let progress = assembly.progress.clone();
        if self.active.insert(msg.transfer_uuid.clone(), assembly).is_some() {
            log::warn!("transfer {:?} restarted", msg.transfer_uuid);
        }
        DownloadUpdate::InProgress(progress)
    }

    /// Append one part. Parts for unknown transfers are dropped.
    /// Out-of-order parts are logged and appended anyway. A part that
    /// would take the file past its declared size fails the transfer.
    pub fn part(&mut self, msg: &FileTransferPart) -> Option<DownloadUpdate> {
        let Some(assembly) = self.active.get_mut(&msg.transfer_uuid) else {
            log::warn!("part {} for unknown transfer {:?}", msg.part, msg.transfer_uuid);
            return None;
        };
        if msg.part != assembly.next_part {
            log::error!(
                "transfer {:?} expected part {} but got {}; a part was dropped",
                msg.transfer_uuid,
                assembly.next_part,
                msg.part
            );
        }
        if msg.part >= assembly.part_count {
            log::warn!(
                "transfer {:?} part {} beyond declared count {}",
                msg.transfer_uuid,
                msg.part,
                assembly.part_count
            );
        }
        let received = assembly
            .progress
            .bytes_downloaded
            .saturating_add(msg.content.len() as u64);
        if received > assembly.progress.size_bytes {
            log::error!(
                "transfer {:?} overshot its declared size ({received} > {}); dropping it",
                msg.transfer_uuid,
                assembly.progress.size_bytes
            );
            return self
                .active
                .remove(&msg.transfer_uuid)
                .map(|assembly| DownloadUpdate::Failed(assembly.progress));
        }
        assembly.next_part += 1;
        assembly.data.extend_from_slice(&msg.content);
        assembly.progress.bytes_downloaded = received;

        if !assembly.progress.is_complete() {
            return Some(DownloadUpdate::InProgress(assembly.progress.clone()));
        }
        self.active
            .remove(&msg.transfer_uuid)
            .map(Assembly::finish)
    }

    /// Forget every transfer in flight.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_bytes::ByteBuf;

    use super::*;

    fn start(uuid: &str, size: u64, parts: u64) -> FileTransferStart {
        FileTransferStart {
            source_component_id: None,
            transfer_uuid: uuid.to_owned(),
            filename: "data.bin".to_owned(),
            mime_type: "application/octet-stream".to_owned(),
            part_count: parts,
            size_bytes: size,
        }
    }

    fn part(uuid: &str, index: u64, bytes: &[u8]) -> FileTransferPart {
        FileTransferPart {
            source_component_id: None,
            transfer_uuid: uuid.to_owned(),
            part: index,
            content: ByteBuf::from(bytes.to_vec()),
        }
    }

    #[test]
    fn three_parts_report_rising_progress_then_complete() {
        let mut downloads = Downloads::new();
        let first = downloads.start(&start("t", 10, 3));
        assert_eq!(first.progress().percent(), 0.0);
        assert_eq!(first.progress().display_size, "10.0B");

        let mut last = 0.0;
        for (i, chunk) in [&b"abcd"[..], b"efgh"].iter().enumerate() {
            let update = downloads.part(&part("t", i as u64, chunk)).unwrap();
            assert!(matches!(update, DownloadUpdate::InProgress(_)));
            assert!(update.progress().percent() > last);
            last = update.progress().percent();
        }
        let DownloadUpdate::Complete { progress, file } =
            downloads.part(&part("t", 2, b"ij")).unwrap()
        else {
            panic!("transfer should be complete");
        };
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(file.data, b"abcdefghij");
        assert_eq!(downloads.in_flight(), 0);
    }

    #[test]
    fn out_of_order_part_is_appended_anyway() {
        let mut downloads = Downloads::new();
        let _ = downloads.start(&start("t", 4, 2));
        let _ = downloads.part(&part("t", 1, b"cd"));
        let update = downloads.part(&part("t", 0, b"ab")).unwrap();
        let DownloadUpdate::Complete { file, .. } = update else {
            panic!("transfer should be complete");
        };
        assert_eq!(file.data, b"cdab");
    }

    #[test]
    fn empty_file_completes_at_start() {
        let mut downloads = Downloads::new();
        assert!(matches!(
            downloads.start(&start("t", 0, 0)),
            DownloadUpdate::Complete { .. }
        ));
        assert_eq!(downloads.in_flight(), 0);
    }

    #[test]
    fn huge_declared_size_does_not_reserve_it_up_front() {
        let mut downloads = Downloads::new();
        let update = downloads.start(&start("big", u64::MAX / 2, 4));
        assert!(matches!(update, DownloadUpdate::InProgress(_)));
        let update = downloads.part(&part("big", 0, b"tiny")).unwrap();
        assert_eq!(update.progress().bytes_downloaded, 4);
        assert!(matches!(update, DownloadUpdate::InProgress(_)));
        assert_eq!(downloads.in_flight(), 1);
    }

    #[test]
    fn bytes_without_parts_fail_at_start() {
        let mut downloads = Downloads::new();
        assert!(matches!(
            downloads.start(&start("t", 100, 0)),
            DownloadUpdate::Failed(_)
        ));
        assert_eq!(downloads.in_flight(), 0);
        assert!(downloads.part(&part("t", 0, b"x")).is_none());
    }

    #[test]
    fn overshooting_the_declared_size_drops_the_transfer() {
        let mut downloads = Downloads::new();
        let _ = downloads.start(&start("t", 4, 2));
        let _ = downloads.part(&part("t", 0, b"ab"));
        let update = downloads.part(&part("t", 1, b"cdef")).unwrap();
        let DownloadUpdate::Failed(progress) = update else {
            panic!("overshoot should fail the transfer");
        };
        assert_eq!(progress.bytes_downloaded, 2);
        assert_eq!(downloads.in_flight(), 0);
        assert!(downloads.part(&part("t", 2, b"g")).is_none());
    }

    #[test]
    fn unknown_transfer_parts_are_dropped() {
        let mut downloads = Downloads::new();
        assert!(downloads.part(&part("nope", 0, b"x")).is_none());
    }
}
