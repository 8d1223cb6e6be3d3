use std::fmt;

/// Source location of the code that reported an event.
///
/// Rendered as `function, file:line` when the function name is known,
/// otherwise `file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Reporting function, when available.
    pub function: Option<String>,

    /// Source file.
    pub file: String,

    /// Line within the file.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{}, {}:{}", function, self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// One log event delivered by the host logging pipeline.
///
/// Ephemeral: constructed once per emitted event, consumed read-only by the
/// formatter. Only `output_to_default` is ever written back, to route the
/// event to the host's own logger when the spool declines it or fails to
/// write it.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Raw message text.
    pub message: String,

    /// Five-character SQL state code.
    pub sql_state: String,

    /// Detail text shown to clients.
    pub detail: Option<String>,

    /// Detail text destined for the server log. Preferred over `detail`
    /// when both are present.
    pub detail_log: Option<String>,

    /// Hint text.
    pub hint: Option<String>,

    /// Internally-generated query, if the event arose from one.
    pub internal_query: Option<String>,

    /// Cursor position within `internal_query`. Zero means unset.
    pub internal_pos: u32,

    /// Context callback output.
    pub context: Option<String>,

    /// The statement the session was executing.
    pub statement: Option<String>,

    /// Cursor position within `statement`. Zero means unset.
    pub cursor_pos: u32,

    /// Suppress statement echoing for this event.
    pub hide_statement: bool,

    /// Where the event was reported from.
    pub location: Option<SourceLocation>,

    /// Whether the event should still reach the host's default logger.
    /// Cleared on capture; re-set when the spool fails to write the record.
    pub output_to_default: bool,
}

impl AuditEvent {
    /// Create an event carrying `message`, destined for the default logger
    /// until the spool captures it.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: "00000".to_string(),
            detail: None,
            detail_log: None,
            hint: None,
            internal_query: None,
            internal_pos: 0,
            context: None,
            statement: None,
            cursor_pos: 0,
            hide_statement: false,
            location: None,
            output_to_default: true,
        }
    }
}
