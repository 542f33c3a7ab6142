//! Analytics over daily manual reports: rollups, Feed Conversion Ratio,
//! mortality rate, and per-report warning flags.
//!
//! The FCR here is an explicit approximation, not a physiological model:
//! it assumes a fixed growth of 50 g/day from the farm's initial average
//! weight. Short date ranges make the estimated weight gain non-positive,
//! in which case the ratio is reported as not computable (`None`) rather
//! than a fabricated number. The same "null, never zero" rule applies to
//! mortality rate when the initial population is missing or zero.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::models::ManualReport;

use super::round2;
use super::thresholds::Thresholds;

/// Assumed daily weight gain per animal, in kg (50 g/day).
const DAILY_GROWTH_KG: f64 = 0.05;

// ---

/// Sums and per-day averages over a set of reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotals {
    pub total_feed: f64,
    pub total_water: f64,
    pub total_deaths: i64,
    pub avg_feed_per_day: Option<f64>,
    pub avg_water_per_day: Option<f64>,
    pub report_count: usize,
}

/// One ISO-week or calendar-month rollup bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// `YYYY-Wnn` for weekly buckets, `YYYY-MM` for monthly.
    pub period: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_feed: f64,
    pub total_water: f64,
    pub total_deaths: i64,
    pub report_count: usize,
}

// ---

/// Totals and averages over the supplied reports. Zero reports yields
/// zero sums and undefined averages.
pub fn totals(reports: &[ManualReport]) -> ReportTotals {
    // ---
    let total_feed: f64 = reports.iter().map(|r| r.feed_consumed).sum();
    let total_water: f64 = reports.iter().map(|r| r.water_consumed).sum();
    let total_deaths: i64 = reports.iter().map(|r| r.deaths).sum();
    let count = reports.len();

    let (avg_feed_per_day, avg_water_per_day) = if count == 0 {
        (None, None)
    } else {
        let n = count as f64;
        (Some(total_feed / n), Some(total_water / n))
    };

    ReportTotals {
        total_feed,
        total_water,
        total_deaths,
        avg_feed_per_day,
        avg_water_per_day,
        report_count: count,
    }
}

fn summarize_by<K, F, L>(reports: &[ManualReport], key: F, label: L) -> Vec<PeriodSummary>
where
    K: Ord,
    F: Fn(&ManualReport) -> K,
    L: Fn(&K) -> String,
{
    use std::collections::BTreeMap;

    struct Acc {
        start: NaiveDate,
        end: NaiveDate,
        feed: f64,
        water: f64,
        deaths: i64,
        count: usize,
    }

    let mut buckets: BTreeMap<K, Acc> = BTreeMap::new();
    for report in reports {
        buckets
            .entry(key(report))
            .and_modify(|acc| {
                acc.start = acc.start.min(report.report_date);
                acc.end = acc.end.max(report.report_date);
                acc.feed += report.feed_consumed;
                acc.water += report.water_consumed;
                acc.deaths += report.deaths;
                acc.count += 1;
            })
            .or_insert_with(|| Acc {
                start: report.report_date,
                end: report.report_date,
                feed: report.feed_consumed,
                water: report.water_consumed,
                deaths: report.deaths,
                count: 1,
            });
    }

    buckets
        .into_iter()
        .map(|(k, acc)| PeriodSummary {
            period: label(&k),
            period_start: acc.start,
            period_end: acc.end,
            total_feed: acc.feed,
            total_water: acc.water,
            total_deaths: acc.deaths,
            report_count: acc.count,
        })
        .collect()
}

/// Group reports by ISO week, ascending.
pub fn weekly_summary(reports: &[ManualReport]) -> Vec<PeriodSummary> {
    // ---
    summarize_by(
        reports,
        |r| {
            let week = r.report_date.iso_week();
            (week.year(), week.week())
        },
        |(year, week)| format!("{year}-W{week:02}"),
    )
}

/// Group reports by calendar month, ascending.
pub fn monthly_summary(reports: &[ManualReport]) -> Vec<PeriodSummary> {
    // ---
    summarize_by(
        reports,
        |r| (r.report_date.year(), r.report_date.month()),
        |(year, month)| format!("{year}-{month:02}"),
    )
}

// ---

/// Cumulative deaths as a percentage of initial population, rounded to
/// two decimals. `None` when the population is unknown or zero.
pub fn mortality_rate(reports: &[ManualReport], initial_population: Option<i64>) -> Option<f64> {
    // ---
    let population = match initial_population {
        Some(p) if p > 0 => p as f64,
        _ => return None,
    };
    let deaths: i64 = reports.iter().map(|r| r.deaths).sum();
    Some(round2(deaths as f64 * 100.0 / population))
}

/// Approximate Feed Conversion Ratio over `reports` for a range starting
/// at `range_start`, evaluated at `now`.
///
/// Requires a positive initial weight and at least one report. The weight
/// gain is estimated from the fixed [`DAILY_GROWTH_KG`] assumption applied
/// to the surviving population; a non-positive gain (e.g. zero elapsed
/// days, or deaths exceeding the population) yields `None`.
pub fn fcr(
    reports: &[ManualReport],
    initial_population: Option<i64>,
    initial_weight: Option<f64>,
    range_start: NaiveDate,
    now: DateTime<Utc>,
) -> Option<f64> {
    // ---
    let initial_weight = match initial_weight {
        Some(w) if w > 0.0 => w,
        _ => return None,
    };
    if reports.is_empty() {
        return None;
    }

    let total_feed: f64 = reports.iter().map(|r| r.feed_consumed).sum();
    let total_deaths: i64 = reports.iter().map(|r| r.deaths).sum();
    let current_population = initial_population.unwrap_or(1) - total_deaths;

    let days_elapsed = (now.date_naive() - range_start).num_days() as f64;
    let estimated_current_weight = initial_weight + days_elapsed * DAILY_GROWTH_KG;
    let total_weight_gain = (estimated_current_weight - initial_weight) * current_population as f64;

    if total_weight_gain <= 0.0 {
        return None;
    }
    Some(round2(total_feed / total_weight_gain))
}

// ---

/// Warning flags for a single report, in feed, water, mortality order.
pub fn report_warnings(
    report: &ManualReport,
    thresholds: &Thresholds,
    initial_population: Option<i64>,
) -> Vec<String> {
    // ---
    let mut warnings = Vec::new();

    if report.feed_consumed < thresholds.feed_min {
        warnings.push("Feed consumption below minimum".to_string());
    }
    if report.water_consumed < thresholds.water_min {
        warnings.push("Water consumption below minimum".to_string());
    }
    if report.deaths > 0 {
        let population = initial_population.unwrap_or(1) as f64;
        let rate = report.deaths as f64 / population * 100.0;
        if rate > 1.0 {
            warnings.push(format!("High mortality: {}%", round2(rate)));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    // ---
    use chrono::TimeZone;

    use super::*;

    fn report(date: NaiveDate, feed: f64, water: f64, deaths: i64) -> ManualReport {
        // ---
        ManualReport {
            id: 0,
            farm_id: 1,
            user_id: 7,
            report_date: date,
            feed_consumed: feed,
            water_consumed: water,
            deaths,
        }
    }

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn totals_over_no_reports() {
        // ---
        let result = totals(&[]);
        assert_eq!(result.total_feed, 0.0);
        assert_eq!(result.total_water, 0.0);
        assert_eq!(result.total_deaths, 0);
        assert_eq!(result.avg_feed_per_day, None);
        assert_eq!(result.avg_water_per_day, None);
        assert_eq!(result.report_count, 0);
    }

    #[test]
    fn totals_sum_and_average() {
        // ---
        let reports = vec![
            report(d(2026, 8, 1), 60.0, 120.0, 2),
            report(d(2026, 8, 2), 80.0, 140.0, 1),
        ];
        let result = totals(&reports);
        assert_eq!(result.total_feed, 140.0);
        assert_eq!(result.total_water, 260.0);
        assert_eq!(result.total_deaths, 3);
        assert_eq!(result.avg_feed_per_day, Some(70.0));
        assert_eq!(result.avg_water_per_day, Some(130.0));
        assert_eq!(result.report_count, 2);
    }

    #[test]
    fn weekly_summary_groups_by_iso_week() {
        // ---
        // 2026-08-02 is a Sunday (ISO week 31); 2026-08-03 starts week 32.
        let reports = vec![
            report(d(2026, 8, 1), 60.0, 120.0, 0),
            report(d(2026, 8, 2), 70.0, 130.0, 1),
            report(d(2026, 8, 3), 80.0, 140.0, 0),
        ];

        let summary = weekly_summary(&reports);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].period, "2026-W31");
        assert_eq!(summary[0].period_start, d(2026, 8, 1));
        assert_eq!(summary[0].period_end, d(2026, 8, 2));
        assert_eq!(summary[0].total_feed, 130.0);
        assert_eq!(summary[0].total_deaths, 1);
        assert_eq!(summary[0].report_count, 2);
        assert_eq!(summary[1].period, "2026-W32");
        assert_eq!(summary[1].report_count, 1);
    }

    #[test]
    fn monthly_summary_groups_by_calendar_month() {
        // ---
        let reports = vec![
            report(d(2026, 7, 30), 60.0, 120.0, 0),
            report(d(2026, 8, 1), 70.0, 130.0, 2),
            report(d(2026, 8, 15), 80.0, 140.0, 0),
        ];

        let summary = monthly_summary(&reports);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].period, "2026-07");
        assert_eq!(summary[1].period, "2026-08");
        assert_eq!(summary[1].total_feed, 150.0);
        assert_eq!(summary[1].total_deaths, 2);
        assert_eq!(summary[1].period_start, d(2026, 8, 1));
        assert_eq!(summary[1].period_end, d(2026, 8, 15));
    }

    #[test]
    fn mortality_rate_examples() {
        // ---
        let reports = vec![
            report(d(2026, 8, 1), 60.0, 120.0, 4),
            report(d(2026, 8, 2), 60.0, 120.0, 6),
        ];
        // 10 deaths out of 5000 is 0.20%.
        assert_eq!(mortality_rate(&reports, Some(5000)), Some(0.2));

        assert_eq!(mortality_rate(&reports, None), None);
        assert_eq!(mortality_rate(&reports, Some(0)), None);
        assert_eq!(mortality_rate(&[], Some(5000)), Some(0.0));
    }

    #[test]
    fn fcr_basic_computation() {
        // ---
        let reports = vec![
            report(d(2026, 8, 1), 500.0, 900.0, 0),
            report(d(2026, 8, 2), 500.0, 900.0, 0),
        ];
        let now = Utc.with_ymd_and_hms(2026, 8, 11, 12, 0, 0).unwrap();

        // 10 days elapsed, 1000 birds: gain = 10 * 0.05 * 1000 = 500 kg.
        // FCR = 1000 / 500 = 2.0.
        let result = fcr(&reports, Some(1000), Some(1.0), d(2026, 8, 1), now);
        assert_eq!(result, Some(2.0));
    }

    #[test]
    fn fcr_not_computable_cases() {
        // ---
        let reports = vec![report(d(2026, 8, 1), 500.0, 900.0, 0)];
        let now = Utc.with_ymd_and_hms(2026, 8, 11, 12, 0, 0).unwrap();
        let start = d(2026, 8, 1);

        // Missing or non-positive initial weight.
        assert_eq!(fcr(&reports, Some(1000), None, start, now), None);
        assert_eq!(fcr(&reports, Some(1000), Some(0.0), start, now), None);
        // No reports at all.
        assert_eq!(fcr(&[], Some(1000), Some(1.0), start, now), None);
        // Zero elapsed days: weight gain is zero.
        assert_eq!(
            fcr(&reports, Some(1000), Some(1.0), now.date_naive(), now),
            None
        );
        // Deaths wiping out the population make the gain non-positive.
        let wiped = vec![report(d(2026, 8, 1), 500.0, 900.0, 1000)];
        assert_eq!(fcr(&wiped, Some(1000), Some(1.0), start, now), None);
    }

    #[test]
    fn fcr_monotone_in_feed() {
        // ---
        let now = Utc.with_ymd_and_hms(2026, 8, 11, 12, 0, 0).unwrap();
        let start = d(2026, 8, 1);

        let mut previous = 0.0;
        for feed in [100.0, 500.0, 1000.0, 5000.0] {
            let reports = vec![report(start, feed, 900.0, 0)];
            let value = fcr(&reports, Some(1000), Some(1.0), start, now)
                .expect("computable");
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn warnings_flag_feed_only() {
        // ---
        let r = report(d(2026, 8, 1), 40.0, 120.0, 0);
        let flags = report_warnings(&r, &Thresholds::default(), Some(5000));
        assert_eq!(flags, vec!["Feed consumption below minimum".to_string()]);
    }

    #[test]
    fn warnings_cooccur_in_fixed_order() {
        // ---
        // 100 deaths out of 5000 is 2%: above the 1% mortality bar.
        let r = report(d(2026, 8, 1), 40.0, 90.0, 100);
        let flags = report_warnings(&r, &Thresholds::default(), Some(5000));
        assert_eq!(
            flags,
            vec![
                "Feed consumption below minimum".to_string(),
                "Water consumption below minimum".to_string(),
                "High mortality: 2%".to_string(),
            ]
        );
    }

    #[test]
    fn warnings_respect_configured_minimums() {
        // ---
        let mut thresholds = Thresholds::default();
        thresholds.feed_min = 30.0;
        thresholds.water_min = 200.0;

        let r = report(d(2026, 8, 1), 40.0, 120.0, 0);
        let flags = report_warnings(&r, &thresholds, Some(5000));
        assert_eq!(flags, vec!["Water consumption below minimum".to_string()]);
    }

    #[test]
    fn low_mortality_is_not_flagged() {
        // ---
        // 10 of 5000 is 0.2%, below the 1% bar.
        let r = report(d(2026, 8, 1), 60.0, 120.0, 10);
        let flags = report_warnings(&r, &Thresholds::default(), Some(5000));
        assert!(flags.is_empty());
    }
}
