//! Audit record serialization.
//!
//! One event becomes one comma-delimited, newline-terminated line with a
//! fixed field count and order. Commas inside field values are not escaped;
//! downstream parsers rely on positional fields and accept that limitation.
//! Absent values render empty so the positions never shift.

use auditspool_core::{AuditEvent, ErrorVerbosity, SessionContext};
use chrono::{DateTime, FixedOffset};

/// Number of fields in every formatted record.
pub const AUDIT_FIELD_COUNT: usize = 22;

/// Record timestamp, millisecond precision.
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %Z";

/// Session start timestamp, second precision.
const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Render the session start timestamp.
///
/// Cached by the worker per process identity rather than recomputed on
/// every record.
pub fn format_start_time(start: DateTime<FixedOffset>) -> String {
    start.format(START_TIME_FORMAT).to_string()
}

/// Serialize one intercepted event into one audit line.
///
/// `strip` leading bytes of the message (the audit marker) are excluded.
/// `start_time_text` is the worker's cached rendering of the session start.
pub fn format_record(
    event: &AuditEvent,
    ctx: &SessionContext,
    line_number: u64,
    start_time_text: &str,
    now: DateTime<FixedOffset>,
    verbosity: ErrorVerbosity,
    strip: usize,
) -> String {
    let mut line = String::with_capacity(256);

    // timestamp with milliseconds
    line.push_str(&now.format(LOG_TIME_FORMAT).to_string());
    line.push(',');

    // user name
    if let Some(user) = &ctx.user {
        line.push_str(user);
    }
    line.push(',');

    // database name
    if let Some(database) = &ctx.database {
        line.push_str(database);
    }
    line.push(',');

    // process id
    line.push_str(&ctx.pid.to_string());
    line.push(',');

    // remote host and port
    if let Some(host) = &ctx.remote_host {
        line.push_str(host);
        if let Some(port) = &ctx.remote_port {
            if !port.is_empty() {
                line.push(':');
                line.push_str(port);
            }
        }
    }
    line.push(',');

    // session id - hex representation of start time . process id
    line.push_str(&format!(
        "{:x}.{:x}",
        ctx.session_start.timestamp(),
        ctx.pid
    ));
    line.push(',');

    // line number
    line.push_str(&line_number.to_string());
    line.push(',');

    // process title
    if let Some(title) = &ctx.process_title {
        line.push_str(title);
    }
    line.push(',');

    // session start timestamp
    line.push_str(start_time_text);
    line.push(',');

    // virtual transaction id
    if let Some(vxid) = &ctx.virtual_txid {
        line.push_str(&vxid.to_string());
    }
    line.push(',');

    // transaction id
    line.push_str(&ctx.transaction_id.to_string());
    line.push(',');

    // SQL state code
    line.push_str(&event.sql_state);
    line.push(',');

    // message, audit marker excluded
    line.push_str(event.message.get(strip..).unwrap_or(""));
    line.push(',');

    // detail, preferring the log-destined variant
    if let Some(detail) = event.detail_log.as_ref().or(event.detail.as_ref()) {
        line.push_str(detail);
    }
    line.push(',');

    // hint
    if let Some(hint) = &event.hint {
        line.push_str(hint);
    }
    line.push(',');

    // internal query
    if let Some(internal_query) = &event.internal_query {
        line.push_str(internal_query);
    }
    line.push(',');

    // if printed internal query, print internal position too
    if event.internal_pos > 0 && event.internal_query.is_some() {
        line.push_str(&event.internal_pos.to_string());
    }
    line.push(',');

    // context
    if let Some(context) = &event.context {
        line.push_str(context);
    }
    line.push(',');

    // statement - only reported when the event does not suppress it
    let print_statement = !event.hide_statement && event.statement.is_some();
    if let Some(statement) = event.statement.as_ref().filter(|_| print_statement) {
        line.push_str(statement);
    }
    line.push(',');
    if print_statement && event.cursor_pos > 0 {
        line.push_str(&event.cursor_pos.to_string());
    }
    line.push(',');

    // source location under verbose reporting
    if verbosity == ErrorVerbosity::Verbose {
        if let Some(location) = &event.location {
            line.push_str(&location.to_string());
        }
    }
    line.push(',');

    // application name
    if let Some(application_name) = &ctx.application_name {
        line.push_str(application_name);
    }

    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditspool_core::{SourceLocation, VirtualTransactionId};
    use chrono::TimeZone;

    fn ts(h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, h, mi, s)
            .unwrap()
    }

    fn base_ctx() -> SessionContext {
        SessionContext::new(4242, ts(9, 0, 0))
    }

    fn fields(line: &str) -> Vec<&str> {
        line.trim_end_matches('\n').split(',').collect()
    }

    fn render(event: &AuditEvent, ctx: &SessionContext, strip: usize) -> String {
        let start_text = format_start_time(ctx.session_start);
        format_record(
            event,
            ctx,
            1,
            &start_text,
            ts(10, 15, 0),
            ErrorVerbosity::Default,
            strip,
        )
    }

    #[test]
    fn test_field_count_with_empty_optionals() {
        let event = AuditEvent::new("AUDIT: SESSION");
        let line = render(&event, &base_ctx(), 7);
        assert!(line.ends_with('\n'));
        assert_eq!(fields(&line).len(), AUDIT_FIELD_COUNT);
    }

    #[test]
    fn test_field_count_with_all_fields_populated() {
        let mut ctx = base_ctx();
        ctx.user = Some("alice".into());
        ctx.database = Some("shop".into());
        ctx.remote_host = Some("10.0.0.5".into());
        ctx.remote_port = Some("50432".into());
        ctx.process_title = Some("worker: alice shop SELECT".into());
        ctx.virtual_txid = Some(VirtualTransactionId {
            backend_id: 3,
            local_xid: 1279,
        });
        ctx.transaction_id = 90211;
        ctx.application_name = Some("reports".into());

        let mut event = AuditEvent::new("AUDIT: SESSION");
        event.detail = Some("detail".into());
        event.hint = Some("hint".into());
        event.internal_query = Some("SELECT 2".into());
        event.internal_pos = 4;
        event.context = Some("PL/pgSQL function".into());
        event.statement = Some("SELECT 1".into());
        event.cursor_pos = 8;

        let line = render(&event, &ctx, 7);
        let fields = fields(&line);
        assert_eq!(fields.len(), AUDIT_FIELD_COUNT);
        assert_eq!(fields[1], "alice");
        assert_eq!(fields[2], "shop");
        assert_eq!(fields[3], "4242");
        assert_eq!(fields[4], "10.0.0.5:50432");
        assert_eq!(fields[9], "3/1279");
        assert_eq!(fields[10], "90211");
        assert_eq!(fields[12], "SESSION");
        assert_eq!(fields[18], "SELECT 1");
        assert_eq!(fields[19], "8");
        assert_eq!(fields[21], "reports");
    }

    #[test]
    fn test_marker_strip_preserves_embedded_comma() {
        let event = AuditEvent::new("AUDIT: foo,bar");
        let line = render(&event, &base_ctx(), 7);
        // The embedded comma is not escaped: the message occupies two
        // split positions
        let fields = fields(&line);
        assert_eq!(fields.len(), AUDIT_FIELD_COUNT + 1);
        assert_eq!(fields[12], "foo");
        assert_eq!(fields[13], "bar");
    }

    #[test]
    fn test_session_id_is_hex_of_start_and_pid() {
        let ctx = base_ctx();
        let event = AuditEvent::new("AUDIT: SESSION");
        let line = render(&event, &ctx, 7);
        let expected = format!("{:x}.{:x}", ctx.session_start.timestamp(), ctx.pid);
        assert_eq!(fields(&line)[5], expected);
    }

    #[test]
    fn test_statement_suppression() {
        let mut event = AuditEvent::new("AUDIT: SESSION");
        event.statement = Some("SELECT secret".into());
        event.cursor_pos = 3;
        event.hide_statement = true;

        let line = render(&event, &base_ctx(), 7);
        let fields = fields(&line);
        assert_eq!(fields[18], "");
        assert_eq!(fields[19], "");
    }

    #[test]
    fn test_internal_pos_requires_internal_query() {
        let mut event = AuditEvent::new("AUDIT: SESSION");
        event.internal_pos = 9;
        let line = render(&event, &base_ctx(), 7);
        assert_eq!(fields(&line)[16], "");
    }

    #[test]
    fn test_detail_log_preferred_over_detail() {
        let mut event = AuditEvent::new("AUDIT: SESSION");
        event.detail = Some("client detail".into());
        event.detail_log = Some("log detail".into());
        let line = render(&event, &base_ctx(), 7);
        assert_eq!(fields(&line)[13], "log detail");
    }

    #[test]
    fn test_location_only_under_verbose() {
        let mut event = AuditEvent::new("AUDIT: SESSION");
        event.location = Some(SourceLocation {
            function: Some("exec_simple_query".into()),
            file: "postgres.c".into(),
            line: 1045,
        });
        let ctx = base_ctx();
        let start_text = format_start_time(ctx.session_start);

        let quiet = format_record(
            &event,
            &ctx,
            1,
            &start_text,
            ts(10, 15, 0),
            ErrorVerbosity::Default,
            7,
        );
        assert_eq!(fields(&quiet)[20], "");

        let verbose = format_record(
            &event,
            &ctx,
            1,
            &start_text,
            ts(10, 15, 0),
            ErrorVerbosity::Verbose,
            7,
        );
        // The location's own comma costs one extra split position
        assert!(verbose.contains("exec_simple_query, postgres.c:1045"));
    }

    #[test]
    fn test_record_timestamp_has_milliseconds() {
        let event = AuditEvent::new("AUDIT: SESSION");
        let ctx = base_ctx();
        let start_text = format_start_time(ctx.session_start);
        let now = ts(10, 15, 0) + chrono::Duration::milliseconds(250);
        let line = format_record(
            &event,
            &ctx,
            1,
            &start_text,
            now,
            ErrorVerbosity::Default,
            7,
        );
        assert!(line.starts_with("2024-03-15 10:15:00.250 "));
    }

    #[test]
    fn test_port_omitted_when_empty() {
        let mut ctx = base_ctx();
        ctx.remote_host = Some("[local]".into());
        ctx.remote_port = Some(String::new());
        let event = AuditEvent::new("AUDIT: SESSION");
        let line = render(&event, &ctx, 7);
        assert_eq!(fields(&line)[4], "[local]");
    }
}
