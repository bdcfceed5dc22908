//! Toast notifications, including the progress toasts of file transfers.

use super::UploadProgress;
use crate::protocol::gui::{AutoClose, NotificationMessage};
use crate::transfer::{format_size, DownloadProgress};

/// How long a finished transfer toast stays up.
const TRANSFER_DONE_AUTO_CLOSE_MS: f64 = 4000.0;

/// One notification as currently displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Notification id.
    pub id: String,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Whether a busy indicator is shown.
    pub loading: bool,
    /// Whether the user can dismiss it.
    pub with_close_button: bool,
    /// Dismissal policy.
    pub auto_close: AutoClose,
    /// Accent color.
    pub color: Option<String>,
    /// Progress bar value in percent, for transfer toasts.
    pub progress: Option<f64>,
}

impl From<NotificationMessage> for Notification {
    fn from(msg: NotificationMessage) -> Self {
        Self {
            id: msg.id,
            title: msg.title,
            body: msg.body,
            loading: msg.loading,
            with_close_button: msg.with_close_button,
            auto_close: msg.auto_close,
            color: msg.color,
            progress: None,
        }
    }
}

impl Notification {
    /// Notification id used for a download's progress toast.
    #[must_use]
    pub fn download_id(transfer_uuid: &str) -> String {
        format!("download-{transfer_uuid}")
    }

    /// Progress toast for a download.
    #[must_use]
    pub fn for_download(progress: &DownloadProgress) -> Self {
        let done = progress.is_complete();
        let verb = if done { "Downloaded" } else { "Downloading" };
        Self {
            id: Self::download_id(&progress.transfer_uuid),
            title: format!(
                "{verb} {} ({})",
                progress.filename, progress.display_size
            ),
            body: String::new(),
            loading: !done,
            with_close_button: done,
            auto_close: if done {
                AutoClose::After(TRANSFER_DONE_AUTO_CLOSE_MS)
            } else {
                AutoClose::Never(false)
            },
            color: None,
            progress: Some(progress.percent()),
        }
    }

    /// Notification id used for an upload's progress toast.
    #[must_use]
    pub fn upload_id(transfer_uuid: &str) -> String {
        format!("upload-{transfer_uuid}")
    }

    /// Progress toast for an upload.
    #[must_use]
    pub fn for_upload(upload: &UploadProgress) -> Self {
        let done = upload.uploaded_bytes >= upload.total_bytes;
        let percent = if upload.total_bytes == 0 {
            100.0
        } else {
            100.0 * upload.uploaded_bytes as f64 / upload.total_bytes as f64
        };
        Self {
            id: Self::upload_id(&upload.transfer_uuid),
            title: format!(
                "Uploading {} ({})",
                upload.filename,
                format_size(upload.total_bytes)
            ),
            body: if done {
                "File uploaded successfully.".to_owned()
            } else {
                String::new()
            },
            loading: !done,
            with_close_button: done,
            auto_close: if done {
                AutoClose::After(TRANSFER_DONE_AUTO_CLOSE_MS)
            } else {
                AutoClose::Never(false)
            },
            color: None,
            progress: (!done).then_some(percent),
        }
    }
}
