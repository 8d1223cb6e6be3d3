//! Several threads spooling concurrently into one shared target file,
//! then a forced rotation moving all of them to a new directory.

use auditspool::{AuditEvent, AuditSpool, SessionContext, SpoolConfig};
use chrono::Local;
use std::sync::Arc;
use std::thread;

fn main() -> auditspool::Result<()> {
    let config = SpoolConfig::new()
        .with_directory("./audit-demo")
        .with_rotation_interval_minutes(60);
    let spool = Arc::new(AuditSpool::new(config)?);

    let handles: Vec<_> = (0..4)
        .map(|worker_id| {
            let spool = Arc::clone(&spool);
            thread::spawn(move || {
                let mut worker = spool.worker();
                let ctx =
                    SessionContext::new(1000 + worker_id, Local::now().fixed_offset());
                for n in 0..25 {
                    let mut event = AuditEvent::new(format!(
                        "AUDIT: SESSION,{n},1,READ,SELECT,,,SELECT {n};,<not logged>"
                    ));
                    worker.emit(&mut event, &ctx);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }

    // A configuration change forces every worker onto the new target on its
    // next write
    let moved = spool.config().with_directory("./audit-demo-rotated");
    spool.reconfigure(moved)?;

    let mut worker = spool.worker();
    let ctx = SessionContext::new(2000, Local::now().fixed_offset());
    let mut event = AuditEvent::new("AUDIT: SESSION,1,1,READ,SELECT,,,SELECT 'after';,<not logged>");
    worker.emit(&mut event, &ctx);
    if let Some(path) = worker.open_path() {
        println!("post-rotation records go to {}", path.display());
    }
    Ok(())
}
