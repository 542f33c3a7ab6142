//! Time-series bucketing and statistics over sensor readings.
//!
//! Readings are grouped by truncating the timestamp to the hour or to the
//! calendar day. Buckets with no readings are omitted rather than
//! zero-filled, and output is ordered ascending by bucket start. The
//! lookback window is measured from the evaluation instant the caller
//! passes in, never from a stored field.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::models::SensorReading;

// ---

/// One aggregated bucket of sensor readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesBucket {
    /// `YYYY-MM-DD HH:00:00` for hourly buckets, `YYYY-MM-DD` for daily.
    pub bucket_start: String,
    pub reading_count: usize,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_humidity: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    pub avg_ammonia: f64,
    pub min_ammonia: f64,
    pub max_ammonia: f64,
}

/// Whole-range statistics. Metric fields are `None` when no readings
/// exist; the count is still reported so callers can distinguish "no
/// data" without an error path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStats {
    pub total_readings: usize,
    pub avg_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub min_humidity: Option<f64>,
    pub max_humidity: Option<f64>,
    pub avg_ammonia: Option<f64>,
    pub min_ammonia: Option<f64>,
    pub max_ammonia: Option<f64>,
}

// ---

#[derive(Debug, Clone, Copy)]
struct MetricAcc {
    sum: f64,
    min: f64,
    max: f64,
}

impl MetricAcc {
    // ---
    fn new(value: f64) -> Self {
        MetricAcc {
            sum: value,
            min: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

struct BucketAcc {
    count: usize,
    temperature: MetricAcc,
    humidity: MetricAcc,
    ammonia: MetricAcc,
}

impl BucketAcc {
    // ---
    fn new(reading: &SensorReading) -> Self {
        BucketAcc {
            count: 1,
            temperature: MetricAcc::new(reading.temperature),
            humidity: MetricAcc::new(reading.humidity),
            ammonia: MetricAcc::new(reading.ammonia),
        }
    }

    fn push(&mut self, reading: &SensorReading) {
        self.count += 1;
        self.temperature.push(reading.temperature);
        self.humidity.push(reading.humidity);
        self.ammonia.push(reading.ammonia);
    }

    fn finish(self, bucket_start: String) -> SeriesBucket {
        let n = self.count as f64;
        SeriesBucket {
            bucket_start,
            reading_count: self.count,
            avg_temperature: self.temperature.sum / n,
            min_temperature: self.temperature.min,
            max_temperature: self.temperature.max,
            avg_humidity: self.humidity.sum / n,
            min_humidity: self.humidity.min,
            max_humidity: self.humidity.max,
            avg_ammonia: self.ammonia.sum / n,
            min_ammonia: self.ammonia.min,
            max_ammonia: self.ammonia.max,
        }
    }
}

fn bucketize<K, F, L>(
    readings: &[SensorReading],
    cutoff: DateTime<Utc>,
    key: F,
    label: L,
) -> Vec<SeriesBucket>
where
    K: Ord,
    F: Fn(&SensorReading) -> K,
    L: Fn(&K) -> String,
{
    // BTreeMap keeps buckets in ascending key order.
    let mut buckets: BTreeMap<K, BucketAcc> = BTreeMap::new();
    for reading in readings.iter().filter(|r| r.timestamp >= cutoff) {
        buckets
            .entry(key(reading))
            .and_modify(|acc| acc.push(reading))
            .or_insert_with(|| BucketAcc::new(reading));
    }

    buckets
        .into_iter()
        .map(|(k, acc)| acc.finish(label(&k)))
        .collect()
}

// ---

/// Hourly avg/min/max buckets over the last `window_hours` hours.
pub fn hourly_averages(
    readings: &[SensorReading],
    now: DateTime<Utc>,
    window_hours: i64,
) -> Vec<SeriesBucket> {
    // ---
    bucketize(
        readings,
        now - Duration::hours(window_hours),
        |r| (r.timestamp.date_naive(), r.timestamp.hour()),
        |(date, hour)| format!("{date} {hour:02}:00:00"),
    )
}

/// Daily avg/min/max buckets over the last `window_days` days.
pub fn daily_averages(
    readings: &[SensorReading],
    now: DateTime<Utc>,
    window_days: i64,
) -> Vec<SeriesBucket> {
    // ---
    bucketize(
        readings,
        now - Duration::days(window_days),
        |r| r.timestamp.date_naive(),
        NaiveDate::to_string,
    )
}

/// Statistics over every reading in the supplied snapshot.
pub fn stats(readings: &[SensorReading]) -> SensorStats {
    // ---
    let acc = match readings.split_first() {
        Some((first, rest)) => {
            let mut acc = BucketAcc::new(first);
            for reading in rest {
                acc.push(reading);
            }
            Some(acc)
        }
        None => None,
    };

    match acc {
        None => SensorStats {
            total_readings: 0,
            avg_temperature: None,
            min_temperature: None,
            max_temperature: None,
            avg_humidity: None,
            min_humidity: None,
            max_humidity: None,
            avg_ammonia: None,
            min_ammonia: None,
            max_ammonia: None,
        },
        Some(acc) => {
            let n = acc.count as f64;
            SensorStats {
                total_readings: acc.count,
                avg_temperature: Some(acc.temperature.sum / n),
                min_temperature: Some(acc.temperature.min),
                max_temperature: Some(acc.temperature.max),
                avg_humidity: Some(acc.humidity.sum / n),
                min_humidity: Some(acc.humidity.min),
                max_humidity: Some(acc.humidity.max),
                avg_ammonia: Some(acc.ammonia.sum / n),
                min_ammonia: Some(acc.ammonia.min),
                max_ammonia: Some(acc.ammonia.max),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use chrono::TimeZone;

    use super::*;

    fn reading_at(ts: DateTime<Utc>, temperature: f64) -> SensorReading {
        // ---
        SensorReading {
            farm_id: 1,
            timestamp: ts,
            temperature,
            humidity: 65.0,
            ammonia: 10.0,
            data_source: "IOT".to_string(),
        }
    }

    fn t(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn hourly_buckets_by_truncated_hour() {
        // ---
        let now = t(10, 12, 0);
        let readings = vec![
            reading_at(t(10, 9, 5), 30.0),
            reading_at(t(10, 9, 40), 34.0),
            reading_at(t(10, 11, 0), 28.0),
        ];

        let buckets = hourly_averages(&readings, now, 24);
        assert_eq!(buckets.len(), 2);

        assert_eq!(buckets[0].bucket_start, "2026-08-10 09:00:00");
        assert_eq!(buckets[0].reading_count, 2);
        assert_eq!(buckets[0].avg_temperature, 32.0);
        assert_eq!(buckets[0].min_temperature, 30.0);
        assert_eq!(buckets[0].max_temperature, 34.0);

        assert_eq!(buckets[1].bucket_start, "2026-08-10 11:00:00");
        assert_eq!(buckets[1].reading_count, 1);
    }

    #[test]
    fn window_excludes_older_readings() {
        // ---
        let now = t(10, 12, 0);
        let readings = vec![
            reading_at(t(10, 11, 30), 30.0),
            reading_at(t(9, 11, 30), 99.0), // outside a 2 hour window
        ];

        let buckets = hourly_averages(&readings, now, 2);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket_start, "2026-08-10 11:00:00");
    }

    #[test]
    fn daily_buckets_partition_disjointly() {
        // ---
        let now = t(15, 0, 0);
        let readings = vec![
            reading_at(t(12, 23, 59), 30.0),
            reading_at(t(13, 0, 0), 31.0),
            reading_at(t(13, 12, 0), 33.0),
            reading_at(t(14, 6, 0), 29.0),
        ];

        let buckets = daily_averages(&readings, now, 30);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].bucket_start, "2026-08-12");
        assert_eq!(buckets[1].bucket_start, "2026-08-13");
        assert_eq!(buckets[2].bucket_start, "2026-08-14");

        // Every reading in range lands in exactly one bucket, and no
        // bucket is emitted empty.
        let total: usize = buckets.iter().map(|b| b.reading_count).sum();
        assert_eq!(total, readings.len());
        assert!(buckets.iter().all(|b| b.reading_count > 0));

        assert_eq!(buckets[1].avg_temperature, 32.0);
    }

    #[test]
    fn buckets_are_ascending() {
        // ---
        let now = t(15, 0, 0);
        // Deliberately unordered input.
        let readings = vec![
            reading_at(t(14, 6, 0), 29.0),
            reading_at(t(12, 6, 0), 30.0),
            reading_at(t(13, 6, 0), 31.0),
        ];

        let buckets = daily_averages(&readings, now, 30);
        let starts: Vec<_> = buckets.iter().map(|b| b.bucket_start.clone()).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn stats_over_empty_snapshot_is_zero_count() {
        // ---
        let result = stats(&[]);
        assert_eq!(result.total_readings, 0);
        assert_eq!(result.avg_temperature, None);
        assert_eq!(result.min_ammonia, None);
    }

    #[test]
    fn stats_covers_all_metrics() {
        // ---
        let readings = vec![
            SensorReading {
                farm_id: 1,
                timestamp: t(10, 9, 0),
                temperature: 28.0,
                humidity: 60.0,
                ammonia: 5.0,
                data_source: "IOT".to_string(),
            },
            SensorReading {
                farm_id: 1,
                timestamp: t(10, 10, 0),
                temperature: 32.0,
                humidity: 70.0,
                ammonia: 15.0,
                data_source: "IOT".to_string(),
            },
        ];

        let result = stats(&readings);
        assert_eq!(result.total_readings, 2);
        assert_eq!(result.avg_temperature, Some(30.0));
        assert_eq!(result.min_temperature, Some(28.0));
        assert_eq!(result.max_temperature, Some(32.0));
        assert_eq!(result.avg_humidity, Some(65.0));
        assert_eq!(result.avg_ammonia, Some(10.0));
        assert_eq!(result.max_ammonia, Some(15.0));
    }
}
