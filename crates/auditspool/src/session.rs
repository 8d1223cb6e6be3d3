//! Per-worker file session.
//!
//! Owned exclusively by one worker, never shared. The session remembers
//! which path it has open; staleness after a rotation elsewhere is detected
//! by comparing that path against a freshly derived target, never by
//! inspecting the filesystem.

use auditspool_core::Result;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Lazily opened append handle for the current target file.
#[derive(Debug, Default)]
pub struct FileSession {
    writer: Option<BufWriter<File>>,
    open_path: Option<PathBuf>,
}

impl FileSession {
    /// Create a session with no file open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file is currently open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// The path this session has open, if any.
    pub fn open_path(&self) -> Option<&Path> {
        self.open_path.as_deref()
    }

    /// Open `path` for append, creating it if needed.
    ///
    /// The file is created with `mode`, owner write always forced so the
    /// spool can keep writing its own files. Buffering is sized by
    /// `buffer_size` so one record ideally costs one underlying IO
    /// operation. The target may already exist, created by another worker;
    /// append mode makes concurrent writers safe at the OS level.
    pub fn open(&mut self, path: &Path, mode: u32, buffer_size: usize) -> Result<()> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode | 0o200);
        }
        #[cfg(not(unix))]
        {
            let _ = mode;
        }
        let file = options.open(path)?;
        self.writer = Some(BufWriter::with_capacity(buffer_size, file));
        self.open_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Append one serialized record and flush it to the OS.
    ///
    /// On failure the file stays open: the session is not assumed corrupt
    /// and the next record naturally retries.
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("no spool file open"))?;
        writer.write_all(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Flush and release the open handle, if any.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                tracing::warn!(
                    path = %self.open_path.as_deref().unwrap_or(Path::new("")).display(),
                    error = %err,
                    "failed to flush spool file on close"
                );
            }
        }
        self.open_path = None;
    }
}
