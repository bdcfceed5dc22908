use std::path::{Path, PathBuf};

use super::CompletedDownload;
use crate::error::ClientError;

/// Destination for completed downloads.
pub trait DownloadSink {
    /// Persist one assembled file.
    ///
    /// # Errors
    ///
    /// Implementations return [`ClientError`] when the file cannot be
    /// stored; the caller logs it and carries on.
    fn store(&mut self, file: CompletedDownload) -> Result<(), ClientError>;
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target path for a server-supplied file name. Only the final path
    /// component is used, so names cannot escape the directory.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map_or_else(|| "download".into(), ToOwned::to_owned);
        self.dir.join(name)
    }
}

impl DownloadSink for DirectorySink {
    fn store(&mut self, file: CompletedDownload) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&file.filename);
        std::fs::write(&path, &file.data)?;
        log::info!("saved {} bytes to {}", file.data.len(), path.display());
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Every file stored so far, oldest first.
    pub files: Vec<CompletedDownload>,
}

impl DownloadSink for MemorySink {
    fn store(&mut self, file: CompletedDownload) -> Result<(), ClientError> {
        self.files.push(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cannot_escape_the_directory() {
        let sink = DirectorySink::new("out");
        assert_eq!(sink.path_for("../../etc/passwd"), Path::new("out/passwd"));
        assert_eq!(sink.path_for("report.csv"), Path::new("out/report.csv"));
        assert_eq!(sink.path_for(".."), Path::new("out/download"));
    }

    #[test]
    fn directory_sink_writes_the_file() {
        let dir = std::env::temp_dir().join(format!("scenelink-sink-{}", std::process::id()));
        let mut sink = DirectorySink::new(&dir);
        sink.store(CompletedDownload {
            filename: "hello.txt".to_owned(),
            mime_type: "text/plain".to_owned(),
            data: b"hi".to_vec(),
        })
        .unwrap();
        assert_eq!(std::fs::read(dir.join("hello.txt")).unwrap(), b"hi");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
