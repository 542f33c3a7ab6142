//! Data models shared by the persistence layer and the evaluation core.
//!
//! These are plain value structs: the `eval` modules receive them fully
//! materialized and never touch the database themselves.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---

/// A single stored sensor reading. Immutable once written; "latest" is
/// defined by the maximum `timestamp` per farm.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SensorReading {
    // ---
    pub farm_id: i64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub ammonia: f64,
    pub data_source: String,
}

/// A daily manual report submitted by the field worker assigned to a farm.
///
/// At most one report exists per `(farm_id, report_date)`; the amounts may
/// be corrected after creation but the key may not.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ManualReport {
    // ---
    pub id: i64,
    pub farm_id: i64,
    pub user_id: i64,
    pub report_date: NaiveDate,
    pub feed_consumed: f64,
    pub water_consumed: f64,
    pub deaths: i64,
}

/// Farm record, referenced by every evaluation. `initial_population` and
/// `initial_weight` feed the mortality-rate and FCR computations; when
/// absent or zero those metrics degrade to "not computable" (`None`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farm {
    // ---
    pub farm_id: i64,
    pub farm_name: String,
    pub location: Option<String>,
    pub initial_population: Option<i64>,
    pub initial_weight: Option<f64>,
}

// ---

/// Three-level severity classification, per parameter and per farm.
///
/// The derived `Ord` gives the severity order normal < waspada < bahaya.
/// Wire labels are the Indonesian vocabulary the original API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusLevel {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "waspada")]
    Warning,
    #[serde(rename = "bahaya")]
    Critical,
}

impl StatusLevel {
    // ---
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "normal",
            StatusLevel::Warning => "waspada",
            StatusLevel::Critical => "bahaya",
        }
    }

    /// UI color for this status.
    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "green",
            StatusLevel::Warning => "yellow",
            StatusLevel::Critical => "red",
        }
    }

    pub fn from_label(label: &str) -> Option<StatusLevel> {
        match label {
            "normal" => Some(StatusLevel::Normal),
            "waspada" => Some(StatusLevel::Warning),
            "bahaya" => Some(StatusLevel::Critical),
            _ => None,
        }
    }
}

/// Color for an arbitrary status label; unrecognized labels map to gray.
pub fn status_color(label: &str) -> &'static str {
    StatusLevel::from_label(label).map_or("gray", |s| s.color())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn severity_order_is_strict() {
        // ---
        assert!(StatusLevel::Normal < StatusLevel::Warning);
        assert!(StatusLevel::Warning < StatusLevel::Critical);
    }

    #[test]
    fn labels_round_trip() {
        // ---
        for level in [
            StatusLevel::Normal,
            StatusLevel::Warning,
            StatusLevel::Critical,
        ] {
            assert_eq!(StatusLevel::from_label(level.as_str()), Some(level));
        }
        assert_eq!(StatusLevel::from_label("unknown"), None);
    }

    #[test]
    fn colors_match_vocabulary() {
        // ---
        assert_eq!(status_color("normal"), "green");
        assert_eq!(status_color("waspada"), "yellow");
        assert_eq!(status_color("bahaya"), "red");
        assert_eq!(status_color("whatever"), "gray");
    }

    #[test]
    fn serde_uses_wire_labels() {
        // ---
        assert_eq!(
            serde_json::to_string(&StatusLevel::Critical).unwrap(),
            "\"bahaya\""
        );
        let parsed: StatusLevel = serde_json::from_str("\"waspada\"").unwrap();
        assert_eq!(parsed, StatusLevel::Warning);
    }
}
