use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Chunked file transfer parameters.
pub struct TransferOptions {
    /// Size of each outbound upload part in bytes.
    pub upload_chunk_bytes: usize,
    /// Directory completed downloads are written into.
    pub download_dir: PathBuf,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            upload_chunk_bytes: 512 * 1024,
            download_dir: PathBuf::from("downloads"),
        }
    }
}
