//! Auditspool Core: types and configuration for the audit spool subsystem
//!
//! This crate defines the shared surface of the spool:
//! - `AuditEvent` / `SessionContext`: one intercepted event and the identity
//!   of the worker that emitted it
//! - `SpoolConfig`: directory, filename pattern, rotation interval and
//!   interception toggles, with the host-facing validation rules
//! - `AuditError`: the error taxonomy (open/write failures degrade to the
//!   host's default logger, they are never fatal to a worker)
//! - optional metrics instrumentation behind the `observe` feature

pub mod config;
pub mod error;
pub mod observe;
pub mod types;

pub use config::{ErrorVerbosity, SpoolConfig};
pub use error::{AuditError, Result};
pub use types::{AuditEvent, SessionContext, SourceLocation, VirtualTransactionId};
