pub mod event;
pub mod session;

pub use event::{AuditEvent, SourceLocation};
pub use session::{SessionContext, VirtualTransactionId};
