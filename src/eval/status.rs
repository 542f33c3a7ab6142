//! Farm status classification and critical-alert detection.
//!
//! Temperature and humidity use two-sided bands (normal range nested
//! inside critical bounds); ammonia uses a one-sided upper band. The
//! aggregate escalates to `waspada` only when at least two parameters are
//! simultaneously off-normal — a single mildly-off parameter is not an
//! alarm — and to `bahaya` as soon as any single parameter breaches its
//! critical bound.
//!
//! [`is_critical`] is defined on top of the same per-parameter statuses
//! the classifier computes, so the two can never disagree.

use serde::Serialize;

use crate::models::{SensorReading, StatusLevel};

use super::thresholds::{ThresholdConfig, Thresholds};

// ---

/// Status of each measured parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterStatus {
    pub temperature: StatusLevel,
    pub humidity: StatusLevel,
    pub ammonia: StatusLevel,
}

impl ParameterStatus {
    // ---
    fn levels(&self) -> [StatusLevel; 3] {
        [self.temperature, self.humidity, self.ammonia]
    }
}

/// Full classification result for one farm.
///
/// `parameters` is `None` when there is no reading to evaluate; the
/// aggregate is then `normal` by the deliberate fail-open policy.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub parameters: Option<ParameterStatus>,
    pub aggregate: StatusLevel,
}

// ---

/// Two-sided band: critical bounds outside, normal range inside, warning
/// in between.
fn band_status(value: f64, normal_min: f64, normal_max: f64, critical_low: f64, critical_high: f64) -> StatusLevel {
    if value < critical_low || value > critical_high {
        StatusLevel::Critical
    } else if value >= normal_min && value <= normal_max {
        StatusLevel::Normal
    } else {
        StatusLevel::Warning
    }
}

/// One-sided upper band, used for ammonia.
fn upper_band_status(value: f64, max: f64, critical: f64) -> StatusLevel {
    if value > critical {
        StatusLevel::Critical
    } else if value <= max {
        StatusLevel::Normal
    } else {
        StatusLevel::Warning
    }
}

/// Classify every parameter of `reading` against resolved thresholds.
pub fn parameter_status(reading: &SensorReading, thresholds: &Thresholds) -> ParameterStatus {
    // ---
    ParameterStatus {
        temperature: band_status(
            reading.temperature,
            thresholds.temp_normal_min,
            thresholds.temp_normal_max,
            thresholds.temp_critical_low,
            thresholds.temp_critical_high,
        ),
        humidity: band_status(
            reading.humidity,
            thresholds.humidity_normal_min,
            thresholds.humidity_normal_max,
            thresholds.humidity_critical_low,
            thresholds.humidity_critical_high,
        ),
        ammonia: upper_band_status(
            reading.ammonia,
            thresholds.ammonia_max,
            thresholds.ammonia_critical,
        ),
    }
}

/// Aggregate rule: any critical parameter wins; two or more warnings
/// escalate; otherwise normal.
fn aggregate_status(parameters: &ParameterStatus) -> StatusLevel {
    // ---
    let critical = parameters
        .levels()
        .iter()
        .filter(|&&s| s == StatusLevel::Critical)
        .count();
    let warning = parameters
        .levels()
        .iter()
        .filter(|&&s| s == StatusLevel::Warning)
        .count();

    if critical > 0 {
        StatusLevel::Critical
    } else if warning >= 2 {
        StatusLevel::Warning
    } else {
        StatusLevel::Normal
    }
}

/// Classify a farm from its latest reading and stored configuration.
///
/// Per-parameter statuses are always computed with per-parameter default
/// fallback when a reading exists; the aggregate additionally requires at
/// least one stored configuration value, since a farm with no
/// configuration at all has opted out of evaluation.
pub fn classify(reading: Option<&SensorReading>, config: &ThresholdConfig) -> Classification {
    // ---
    let Some(reading) = reading else {
        // No data: fail open.
        return Classification {
            parameters: None,
            aggregate: StatusLevel::Normal,
        };
    };

    let parameters = parameter_status(reading, &config.resolve());
    let aggregate = if config.is_empty() {
        StatusLevel::Normal
    } else {
        aggregate_status(&parameters)
    };

    Classification {
        parameters: Some(parameters),
        aggregate,
    }
}

/// True iff `classify` would report a `bahaya` aggregate for this reading,
/// i.e. at least one parameter breaches its critical bound and the farm
/// has stored configuration.
pub fn is_critical(reading: &SensorReading, config: &ThresholdConfig) -> bool {
    // ---
    classify(Some(reading), config).aggregate == StatusLevel::Critical
}
