//! Process-wide force-rotation flag.
//!
//! The only state shared between workers. A configuration change sets it;
//! whichever worker next checks for rotation observes and clears it. The
//! flag is level-triggered ("rotate now"), not edge-counted: an idle worker
//! simply picks up the latest state on its next write. If a set/clear cycle
//! is ever missed under extreme concurrency, the rotation schedule check is
//! the backstop that still rotates every worker at the next boundary.

use parking_lot::Mutex;

/// Shared broadcast flag demanding rotation before the next scheduled
/// boundary.
#[derive(Debug, Default)]
pub struct RotationFlag {
    force_rotation: Mutex<bool>,
}

impl RotationFlag {
    /// Create a flag with no rotation pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a rotation. Idempotent: requesting while one is already
    /// pending is a no-op.
    pub fn request(&self) {
        let mut force = self.force_rotation.lock();
        *force = true;
    }

    /// Atomically observe and clear the flag, returning whether a rotation
    /// had been requested. At most one caller observes `true` per request.
    pub fn consume(&self) -> bool {
        let mut force = self.force_rotation.lock();
        std::mem::take(&mut *force)
    }
}
