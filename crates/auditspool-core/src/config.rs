//! Spool configuration.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How much source-location detail events carry into the audit record.
///
/// The source file/line field is only emitted under [`ErrorVerbosity::Verbose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorVerbosity {
    /// Message only.
    Terse,
    /// Message plus detail/hint/context.
    #[default]
    Default,
    /// Everything, including the source location of the reporting code.
    Verbose,
}

/// Configuration for the audit spool.
///
/// An empty `directory` or an empty `filename_pattern` disables the subsystem
/// entirely: every event passes through to the host logger untouched. That is
/// a mode, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoolConfig {
    /// Directory where spool files are created.
    pub directory: PathBuf,

    /// Filename with strftime-style time patterns, minute resolution.
    pub filename_pattern: String,

    /// Automatic rotation happens every N minutes. Must be positive.
    pub rotation_interval_minutes: u32,

    /// Intercept connection messages from the host logging pipeline.
    pub intercept_connections: bool,

    /// Intercept disconnection messages from the host logging pipeline.
    pub intercept_disconnections: bool,

    /// Creation mode for spool files (unix). Owner write is always forced.
    pub file_mode: u32,

    /// Output buffer size per open file. Sized so one record ideally costs
    /// one underlying IO operation.
    pub write_buffer_size: usize,

    /// Source-location verbosity for formatted records.
    pub error_verbosity: ErrorVerbosity,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            filename_pattern: "audit-%Y%m%d_%H%M.log".to_string(),
            // One day
            rotation_interval_minutes: 24 * 60,
            intercept_connections: false,
            intercept_disconnections: false,
            file_mode: 0o600,
            write_buffer_size: 128 * 1024,
            error_verbosity: ErrorVerbosity::Default,
        }
    }
}

impl SpoolConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spool directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the filename pattern.
    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = pattern.into();
        self
    }

    /// Set the rotation interval in minutes.
    pub fn with_rotation_interval_minutes(mut self, minutes: u32) -> Self {
        self.rotation_interval_minutes = minutes;
        self
    }

    /// Enable or disable interception of connection messages.
    pub fn with_intercept_connections(mut self, enabled: bool) -> Self {
        self.intercept_connections = enabled;
        self
    }

    /// Enable or disable interception of disconnection messages.
    pub fn with_intercept_disconnections(mut self, enabled: bool) -> Self {
        self.intercept_disconnections = enabled;
        self
    }

    /// Set the source-location verbosity.
    pub fn with_error_verbosity(mut self, verbosity: ErrorVerbosity) -> Self {
        self.error_verbosity = verbosity;
        self
    }

    /// Validate the configuration.
    ///
    /// A zero rotation interval is rejected here so the rotation clock never
    /// sees it.
    pub fn validate(&self) -> Result<()> {
        if self.rotation_interval_minutes == 0 {
            return Err(AuditError::Config(
                "rotation_interval_minutes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Whether the spool is active. Both the directory and the filename
    /// pattern must be non-empty.
    pub fn is_enabled(&self) -> bool {
        !self.directory.as_os_str().is_empty() && !self.filename_pattern.is_empty()
    }

    /// Rotation interval in seconds.
    pub fn rotation_interval_secs(&self) -> i64 {
        i64::from(self.rotation_interval_minutes) * 60
    }

    /// Whether switching to `new` must force a rotation: the target filename
    /// or the rotation grid would change under open sessions.
    pub fn rotation_affecting_change(&self, new: &SpoolConfig) -> bool {
        self.directory != new.directory
            || self.filename_pattern != new.filename_pattern
            || self.rotation_interval_minutes != new.rotation_interval_minutes
    }
}
