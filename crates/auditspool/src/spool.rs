//! Spool coordinator.
//!
//! The shared half ([`AuditSpool`]) holds the configuration and the
//! force-rotation flag; the per-worker half ([`SpoolWorker`]) owns an open
//! file session, a cached rotation schedule and a line counter, and decides
//! on every write attempt whether its session went stale. Workers never
//! talk to each other: they converge on the same target file because the
//! schedule and the filename derivation are pure functions of wall-clock
//! time and configuration.

use crate::flag::RotationFlag;
use crate::format;
use crate::intercept;
use crate::rotation;
use crate::session::FileSession;
use auditspool_core::observe;
use auditspool_core::{AuditEvent, Result, SessionContext, SpoolConfig};
use chrono::{DateTime, FixedOffset, Local};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// Process-wide spool state, shared by every worker.
pub struct AuditSpool {
    config: RwLock<SpoolConfig>,
    rotation: RotationFlag,
}

impl AuditSpool {
    /// Create a spool with the given configuration.
    pub fn new(config: SpoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(config),
            rotation: RotationFlag::new(),
        })
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SpoolConfig {
        self.config.read().clone()
    }

    /// Install a new configuration.
    ///
    /// When the directory, the filename pattern or the rotation interval
    /// changed, a rotation is requested first so no worker keeps writing to
    /// a target derived from the old values.
    pub fn reconfigure(&self, new: SpoolConfig) -> Result<()> {
        new.validate()?;
        let mut config = self.config.write();
        if config.rotation_affecting_change(&new) {
            self.rotation.request();
        }
        *config = new;
        Ok(())
    }

    /// Request a rotation before the next scheduled boundary.
    pub fn request_rotation(&self) {
        self.rotation.request();
    }

    /// Create a per-worker handle. One per thread of execution; the handle
    /// owns its file session and must not be shared.
    pub fn worker(self: &Arc<Self>) -> SpoolWorker {
        SpoolWorker {
            spool: Arc::clone(self),
            session: FileSession::new(),
            next_rotation: None,
            identity: None,
        }
    }
}

/// Per-identity formatter state: the line counter restarts and the session
/// start stamp is re-rendered when a recycled worker slot changes pid.
struct WorkerIdentity {
    pid: u32,
    line_number: u64,
    start_time_text: String,
}

impl WorkerIdentity {
    fn new(ctx: &SessionContext) -> Self {
        Self {
            pid: ctx.pid,
            line_number: 0,
            start_time_text: format::format_start_time(ctx.session_start),
        }
    }
}

/// One worker's view of the spool. Everything here is exclusively owned;
/// the only cross-worker state is behind the [`AuditSpool`] handle.
pub struct SpoolWorker {
    spool: Arc<AuditSpool>,
    session: FileSession,
    next_rotation: Option<i64>,
    identity: Option<WorkerIdentity>,
}

impl SpoolWorker {
    /// Offer an event to the spool.
    ///
    /// Captured events are written to the active spool file and their
    /// default-log output is suppressed; when the spool cannot take the
    /// record (open or write failure) the flag is re-set so the host's own
    /// logger picks the event up. Non-captured events are left untouched.
    /// Never panics and never blocks beyond the synchronous write itself.
    pub fn emit(&mut self, event: &mut AuditEvent, ctx: &SessionContext) {
        self.emit_at(Local::now().fixed_offset(), event, ctx);
    }

    /// [`emit`](Self::emit) with an explicit wall-clock instant.
    pub fn emit_at(
        &mut self,
        now: DateTime<FixedOffset>,
        event: &mut AuditEvent,
        ctx: &SessionContext,
    ) {
        let spool = Arc::clone(&self.spool);
        let config = spool.config.read();
        if !config.is_enabled() {
            return;
        }
        let Some(strip) = intercept::classify(&event.message, &config) else {
            return;
        };
        event.output_to_default = false;
        if !self.record(now, &config, event, ctx, strip) {
            // the record is lost to the spool; hand the event back to the
            // host's default logger rather than dropping it silently
            event.output_to_default = true;
            observe::record_fallback();
        }
    }

    /// The path this worker's session currently has open, if any.
    pub fn open_path(&self) -> Option<&std::path::Path> {
        self.session.open_path()
    }

    fn record(
        &mut self,
        now: DateTime<FixedOffset>,
        config: &SpoolConfig,
        event: &AuditEvent,
        ctx: &SessionContext,
        strip: usize,
    ) -> bool {
        if let Some(reason) = self.rotation_reason(now, config) {
            // stop writing to the old target; reopening is deferred to the
            // write below
            self.session.close();
            observe::record_rotation(reason);
            tracing::info!(reason, "rotating audit spool file");
        }

        if !self.session.is_open() {
            let target = self.target_filename(now, config);
            if let Err(err) = std::fs::create_dir_all(&config.directory) {
                // best effort: a real problem resurfaces as the open failure
                tracing::debug!(
                    directory = %config.directory.display(),
                    error = %err,
                    "could not create spool directory"
                );
            }
            if let Err(err) =
                self.session
                    .open(&target, config.file_mode, config.write_buffer_size)
            {
                tracing::warn!(
                    path = %target.display(),
                    error = %err,
                    "could not open audit log file"
                );
                observe::record_open_failure();
                return false;
            }
        }

        let identity = match &mut self.identity {
            Some(identity) if identity.pid == ctx.pid => identity,
            slot => slot.insert(WorkerIdentity::new(ctx)),
        };
        identity.line_number += 1;
        let record = format::format_record(
            event,
            ctx,
            identity.line_number,
            &identity.start_time_text,
            now,
            config.error_verbosity,
            strip,
        );

        match self.session.append(record.as_bytes()) {
            Ok(()) => {
                observe::record_write(record.len());
                true
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.session.open_path().unwrap_or_else(|| std::path::Path::new("")).display(),
                    error = %err,
                    "could not write audit log file"
                );
                false
            }
        }
    }

    /// Evaluate, in order: the shared force flag, the cached schedule, and
    /// the stale-filename comparison. Any hit means the open session (if
    /// any) no longer matches the current target.
    fn rotation_reason(
        &mut self,
        now: DateTime<FixedOffset>,
        config: &SpoolConfig,
    ) -> Option<&'static str> {
        let now_secs = now.timestamp();
        let offset = i64::from(now.offset().local_minus_utc());
        let interval = config.rotation_interval_secs();

        // first write on this worker: establish the schedule
        let next = match self.next_rotation {
            Some(next) => next,
            None => {
                let next = rotation::next_rotation_boundary(now_secs, interval, offset);
                self.next_rotation = Some(next);
                next
            }
        };

        if self.spool.rotation.consume() {
            return Some("forced");
        }

        if now_secs >= next {
            self.next_rotation =
                Some(rotation::next_rotation_boundary(now_secs, interval, offset));
            return Some("scheduled");
        }

        // another worker's rotation already moved the shared target
        if let Some(open_path) = self.session.open_path() {
            if open_path != self.target_filename(now, config) {
                return Some("stale");
            }
        }

        None
    }

    /// Target path for the rotation window currently being written: one
    /// interval before the next boundary.
    fn target_filename(&self, now: DateTime<FixedOffset>, config: &SpoolConfig) -> PathBuf {
        let offset = i64::from(now.offset().local_minus_utc());
        let interval = config.rotation_interval_secs();
        let next = self.next_rotation.unwrap_or_else(|| {
            rotation::next_rotation_boundary(now.timestamp(), interval, offset)
        });
        rotation::derive_filename(
            &config.directory,
            &config.filename_pattern,
            next - interval,
            offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, h, mi, s)
            .unwrap()
    }

    fn spool_in(dir: &std::path::Path) -> Arc<AuditSpool> {
        let config = SpoolConfig::new()
            .with_directory(dir)
            .with_filename_pattern("audit-%Y%m%d_%H%M.log")
            .with_rotation_interval_minutes(60);
        Arc::new(AuditSpool::new(config).unwrap())
    }

    fn audit_event() -> AuditEvent {
        AuditEvent::new("AUDIT: SESSION,1,1,READ,SELECT,,,SELECT 1;")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SpoolConfig::new().with_rotation_interval_minutes(0);
        assert!(AuditSpool::new(config).is_err());
    }

    #[test]
    fn test_capture_suppresses_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let spool = spool_in(dir.path());
        let mut worker = spool.worker();
        let ctx = SessionContext::new(100, at(9, 0, 0));

        let mut event = audit_event();
        worker.emit_at(at(10, 15, 0), &mut event, &ctx);
        assert!(!event.output_to_default);
        assert_eq!(
            worker.open_path().unwrap(),
            dir.path().join("audit-20240315_1000.log")
        );
    }

    #[test]
    fn test_line_counter_resets_on_pid_change() {
        let dir = tempfile::tempdir().unwrap();
        let spool = spool_in(dir.path());
        let mut worker = spool.worker();

        let first = SessionContext::new(100, at(9, 0, 0));
        let second = SessionContext::new(200, at(9, 30, 0));

        for _ in 0..3 {
            worker.emit_at(at(10, 15, 0), &mut audit_event(), &first);
        }
        // slot recycled by another process identity
        worker.emit_at(at(10, 16, 0), &mut audit_event(), &second);

        let contents =
            std::fs::read_to_string(dir.path().join("audit-20240315_1000.log")).unwrap();
        let line_numbers: Vec<&str> = contents
            .lines()
            .map(|line| line.split(',').nth(6).unwrap())
            .collect();
        assert_eq!(line_numbers, ["1", "2", "3", "1"]);
    }

    #[test]
    fn test_forced_rotation_reuses_current_window() {
        let dir = tempfile::tempdir().unwrap();
        let spool = spool_in(dir.path());
        let mut worker = spool.worker();
        let ctx = SessionContext::new(100, at(9, 0, 0));

        worker.emit_at(at(10, 15, 0), &mut audit_event(), &ctx);
        let before = worker.open_path().unwrap().to_path_buf();

        // a force with unchanged configuration closes and reopens the same
        // window's file
        spool.request_rotation();
        worker.emit_at(at(10, 16, 0), &mut audit_event(), &ctx);
        assert_eq!(worker.open_path().unwrap(), before);
    }

    #[test]
    fn test_scheduled_rotation_moves_to_next_window() {
        let dir = tempfile::tempdir().unwrap();
        let spool = spool_in(dir.path());
        let mut worker = spool.worker();
        let ctx = SessionContext::new(100, at(9, 0, 0));

        worker.emit_at(at(10, 59, 59), &mut audit_event(), &ctx);
        assert_eq!(
            worker.open_path().unwrap(),
            dir.path().join("audit-20240315_1000.log")
        );

        worker.emit_at(at(11, 0, 1), &mut audit_event(), &ctx);
        assert_eq!(
            worker.open_path().unwrap(),
            dir.path().join("audit-20240315_1100.log")
        );
    }

    #[test]
    fn test_uncaptured_event_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let spool = spool_in(dir.path());
        let mut worker = spool.worker();
        let ctx = SessionContext::new(100, at(9, 0, 0));

        let mut event = AuditEvent::new("checkpoint starting: time");
        worker.emit_at(at(10, 15, 0), &mut event, &ctx);
        assert!(event.output_to_default);
        assert!(worker.open_path().is_none());
    }
}
