use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Virtual transaction identifier: backend slot plus backend-local
/// transaction id. Rendered as `backend/lxid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualTransactionId {
    /// Backend slot number.
    pub backend_id: i32,

    /// Backend-local transaction id.
    pub local_xid: u32,
}

impl fmt::Display for VirtualTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend_id, self.local_xid)
    }
}

/// Identity and transaction metadata of the worker emitting an event.
///
/// Supplied by the host's session/transaction providers and consumed
/// read-only by the record formatter.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Authenticated user name, when a client session exists.
    pub user: Option<String>,

    /// Connected database, when a client session exists.
    pub database: Option<String>,

    /// Worker process id.
    pub pid: u32,

    /// Remote client host.
    pub remote_host: Option<String>,

    /// Remote client port, as reported by the host.
    pub remote_port: Option<String>,

    /// Process title, as shown in the process table.
    pub process_title: Option<String>,

    /// When this session started.
    pub session_start: DateTime<FixedOffset>,

    /// Virtual transaction id, when a transaction is open.
    pub virtual_txid: Option<VirtualTransactionId>,

    /// Assigned transaction id. Zero when none has been assigned.
    pub transaction_id: u32,

    /// Client-reported application name.
    pub application_name: Option<String>,
}

impl SessionContext {
    /// Create a context for a worker with no client session attached.
    pub fn new(pid: u32, session_start: DateTime<FixedOffset>) -> Self {
        Self {
            user: None,
            database: None,
            pid,
            remote_host: None,
            remote_port: None,
            process_title: None,
            session_start,
            virtual_txid: None,
            transaction_id: 0,
            application_name: None,
        }
    }
}
