//! Rotation schedule and target-filename derivation.
//!
//! Both functions here are pure. Workers never coordinate on rotation:
//! each one recomputes the boundary and the target filename independently
//! from wall-clock time, and because the derivation is deterministic every
//! worker observing the same configuration and the same rotation window
//! lands on a byte-identical path.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};

/// Placeholders substituted by [`derive_filename`]. Everything else after a
/// `%` passes through literally.
const KNOWN_SPECIFIERS: &str = "aAbBCdeghHIjmMpSuUwWyY";

/// Compute the next rotation boundary strictly after `now_secs`.
///
/// The boundary is aligned to whole multiples of `interval_secs` in local
/// wall-clock time: shift into local time, floor to the interval grid, add
/// one interval, shift back. Workers evaluating this near the same instant
/// produce the same boundary (clock skew excepted).
///
/// `interval_secs` must be positive; `SpoolConfig::validate` rejects a zero
/// interval before it can reach this function.
pub fn next_rotation_boundary(now_secs: i64, interval_secs: i64, utc_offset_secs: i64) -> i64 {
    let local = now_secs + utc_offset_secs;
    let floored = local - local.rem_euclid(interval_secs);
    floored + interval_secs - utc_offset_secs
}

/// Derive the target path for the rotation window starting at
/// `window_start_secs`.
///
/// The pattern is rendered strftime-style at minute resolution against the
/// window start in local time; unknown placeholders pass through literally
/// and `%%` renders a single `%`. The directory is joined as-is: this
/// function never touches the filesystem, creation is the coordinator's job.
pub fn derive_filename(
    directory: &Path,
    pattern: &str,
    window_start_secs: i64,
    utc_offset_secs: i64,
) -> PathBuf {
    let offset = FixedOffset::east_opt(utc_offset_secs as i32).unwrap_or_else(|| Utc.fix());
    let window_start = DateTime::from_timestamp(window_start_secs, 0)
        .unwrap_or_default()
        .with_timezone(&offset);
    directory.join(render_pattern(pattern, &window_start))
}

/// Substitute the known time placeholders in `pattern` against `ts`.
fn render_pattern(pattern: &str, ts: &DateTime<FixedOffset>) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(spec) if KNOWN_SPECIFIERS.contains(spec) => {
                out.push_str(&ts.format(&format!("%{spec}")).to_string());
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
