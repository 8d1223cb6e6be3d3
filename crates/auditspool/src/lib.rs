//! # Auditspool
//!
//! Rotating audit-record spool for a database server: intercepts audit
//! events from many independent workers and appends them, one
//! comma-delimited record per line, to a shared set of time-rotated files,
//! separate from the host's general log.
//!
//! Workers share almost nothing. The only cross-worker state is a
//! force-rotation flag behind a mutex; everything else (the open file
//! handle, the cached rotation schedule, the target filename, the line
//! counter) is owned per worker. Workers still converge on the same output
//! file because the rotation boundary and the filename derivation are pure
//! functions of wall-clock time and configuration, and files are opened in
//! append mode so concurrent writers are safe at the OS level.
//!
//! A worker that fails to open or write its spool file never crashes and
//! never blocks its caller: the event is handed back to the host's default
//! logger via the `output_to_default` flag.
//!
//! ## Example
//!
//! ```rust,no_run
//! use auditspool::{AuditEvent, AuditSpool, SessionContext, SpoolConfig};
//! use chrono::Local;
//! use std::sync::Arc;
//!
//! # fn main() -> auditspool::Result<()> {
//! let config = SpoolConfig::new()
//!     .with_directory("./audit")
//!     .with_rotation_interval_minutes(60);
//! let spool = Arc::new(AuditSpool::new(config)?);
//!
//! // One worker per thread of execution
//! let mut worker = spool.worker();
//! let ctx = SessionContext::new(std::process::id(), Local::now().fixed_offset());
//!
//! let mut event = AuditEvent::new("AUDIT: SESSION,1,1,READ,SELECT,,,SELECT 1;,<not logged>");
//! worker.emit(&mut event, &ctx);
//! assert!(!event.output_to_default);
//! # Ok(())
//! # }
//! ```

pub mod flag;
pub mod format;
pub mod intercept;
pub mod rotation;
pub mod session;
pub mod spool;

pub use auditspool_core::{
    AuditError, AuditEvent, ErrorVerbosity, Result, SessionContext, SourceLocation, SpoolConfig,
    VirtualTransactionId,
};
pub use flag::RotationFlag;
pub use format::{format_record, AUDIT_FIELD_COUNT};
pub use intercept::AUDIT_PREFIX;
pub use rotation::{derive_filename, next_rotation_boundary};
pub use session::FileSession;
pub use spool::{AuditSpool, SpoolWorker};
