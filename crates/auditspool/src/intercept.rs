//! Event interception rules.
//!
//! An event is captured iff its message carries the audit marker (which is
//! stripped before formatting), or one of the connection/disconnection
//! phrases when the matching toggle is enabled. All comparisons are
//! case-insensitive prefix matches.

use auditspool_core::SpoolConfig;

/// Marker prefix the audit emitter puts on its own lines.
pub const AUDIT_PREFIX: &str = "AUDIT: ";

const CONNECTION_PREFIXES: &[&str] = &[
    "connection authenticated: identity=",
    "connection authorized: user=",
    "connection received: host=",
    "password authentication failed for user",
    "replication connection authorized: user=",
];

const DISCONNECTION_PREFIXES: &[&str] = &["disconnection: session time:"];

/// Decide whether `message` should be captured by the spool.
///
/// Returns the number of leading bytes to strip before formatting: the
/// marker length for audit lines, zero for intercepted connection and
/// disconnection messages, `None` for everything else.
pub fn classify(message: &str, config: &SpoolConfig) -> Option<usize> {
    if starts_with_ignore_case(message, AUDIT_PREFIX) {
        return Some(AUDIT_PREFIX.len());
    }
    if config.intercept_connections
        && CONNECTION_PREFIXES
            .iter()
            .any(|prefix| starts_with_ignore_case(message, prefix))
    {
        return Some(0);
    }
    if config.intercept_disconnections
        && DISCONNECTION_PREFIXES
            .iter()
            .any(|prefix| starts_with_ignore_case(message, prefix))
    {
        return Some(0);
    }
    None
}

fn starts_with_ignore_case(message: &str, prefix: &str) -> bool {
    message.len() >= prefix.len()
        && message.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
