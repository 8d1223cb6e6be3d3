//! Optional metrics instrumentation for the audit spool.
//!
//! When the `observe` feature is enabled, key operations emit counters via
//! the [`metrics`] crate. A downstream application must install a metrics
//! recorder (e.g. `metrics-exporter-prometheus`) to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

/// Record one audit record written to the spool.
///
/// - `auditspool.records_written_total` – incremented per record
/// - `auditspool.bytes_written_total` – incremented by the record length
#[inline]
pub fn record_write(bytes: usize) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("auditspool.records_written_total").increment(1);
        metrics::counter!("auditspool.bytes_written_total").increment(bytes as u64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = bytes;
    }
}

/// Record a file rotation (scheduled or forced).
///
/// - `auditspool.rotations_total` – counter with `reason` label
///   (`forced` / `scheduled` / `stale`)
#[inline]
pub fn record_rotation(reason: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("auditspool.rotations_total", "reason" => reason).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = reason;
    }
}

/// Record an event falling back to the host's default logger after a
/// failed spool write.
///
/// - `auditspool.fallbacks_total` – counter
#[inline]
pub fn record_fallback() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("auditspool.fallbacks_total").increment(1);
    }
}

/// Record a failed attempt to open the target spool file.
///
/// - `auditspool.open_failures_total` – counter
#[inline]
pub fn record_open_failure() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("auditspool.open_failures_total").increment(1);
    }
}
