//! Minimal end-to-end run: capture a few audit events into ./audit-demo.

use auditspool::{AuditEvent, AuditSpool, SessionContext, SpoolConfig};
use chrono::Local;
use std::sync::Arc;

fn main() -> auditspool::Result<()> {
    let config = SpoolConfig::new()
        .with_directory("./audit-demo")
        .with_rotation_interval_minutes(60)
        .with_intercept_connections(true);
    let spool = Arc::new(AuditSpool::new(config)?);

    let mut worker = spool.worker();
    let mut ctx = SessionContext::new(std::process::id(), Local::now().fixed_offset());
    ctx.user = Some("alice".into());
    ctx.database = Some("shop".into());
    ctx.application_name = Some("basic_usage".into());

    for message in [
        "connection received: host=127.0.0.1 port=50432",
        "AUDIT: SESSION,1,1,READ,SELECT,,,SELECT * FROM orders;,<not logged>",
        "AUDIT: SESSION,2,1,WRITE,INSERT,,,INSERT INTO orders VALUES (1);,<not logged>",
        "checkpoint starting: time",
    ] {
        let mut event = AuditEvent::new(message);
        worker.emit(&mut event, &ctx);
        println!(
            "{} -> {}",
            if event.output_to_default { "passed through" } else { "spooled" },
            message
        );
    }

    if let Some(path) = worker.open_path() {
        println!("records written to {}", path.display());
    }
    Ok(())
}
