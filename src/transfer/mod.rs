//! Chunked file transfer in both directions.
//!
//! A transfer is a `FileTransferStart` naming a unique transfer id, total
//! size and part count, followed by that many `FileTransferPart`s in order.
//! Downloads are reassembled by [`Downloads`] and handed to a
//! [`DownloadSink`] once complete; uploads are produced lazily by an
//! [`UploadPlan`].

/// Inbound transfer reassembly.
pub mod download;
/// Where completed downloads go.
pub mod sink;
/// Outbound transfer chunking.
pub mod upload;

pub use download::{CompletedDownload, DownloadProgress, DownloadUpdate, Downloads};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
pub use upload::UploadPlan;

const SIZE_UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];

/// Human-readable size: divide by 1024 while the value is at least 100,
/// then print one decimal and the unit letter.
///
/// `format_size(1536)` is `"1.5K"`; `format_size(99)` is `"99.0B"`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 100.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1}{}", SIZE_UNITS[unit])
}
