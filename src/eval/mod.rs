//! Pure evaluation core for farm health and analytics.
//!
//! Every function in this tree is a side-effect-free transformation over
//! already-fetched records and configuration; nothing here touches the
//! database or the clock. Callers pass the evaluation instant explicitly
//! where a window or elapsed time is involved, which keeps the whole core
//! deterministic and unit-testable.
//!
//! Submodules:
//! - `thresholds` — per-farm parameter map, defaults, resolution
//! - `status`     — per-parameter classification and farm aggregate
//! - `series`     — hourly/daily bucketing and range statistics
//! - `analytics`  — manual-report rollups, FCR, mortality, warnings

pub mod analytics;
pub mod series;
pub mod status;
pub mod thresholds;

// ---

/// Round to two decimal places, the precision exposed for FCR and
/// mortality-rate figures.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
