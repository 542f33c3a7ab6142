//! Owner-facing analytics endpoints: combined farm analytics, report
//! listings with warning flags, and range statistics.
//!
//! Handlers materialize the relevant rows and delegate every computation
//! to the pure `eval` functions; nothing numeric is decided here.

use axum::{
    extract::Path, extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::get, Router,
};
use chrono::{DateTime, Days, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::eval::analytics::{
    fcr, monthly_summary, mortality_rate, report_warnings, totals, weekly_summary,
};
use crate::eval::series::{daily_averages, stats};
use crate::models::Farm;
use crate::store;

use super::{db_failure, fail_json, lookback_days, ok_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new()
        .route("/farms/{id}/analytics", get(farm_analytics))
        .route("/farms/{id}/reports", get(farm_reports))
        .route("/farms/{id}/statistics", get(farm_statistics))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl RangeQuery {
    /// Inclusive date range, defaulting to the last 30 days.
    fn resolve(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        // ---
        let end = self.end_date.unwrap_or_else(|| now.date_naive());
        let start = self
            .start_date
            .unwrap_or_else(|| now.date_naive() - Duration::days(30));
        (start, end)
    }
}

/// Timestamp bounds covering the inclusive date range `[start, end]`.
/// `None` when the end date sits at the calendar limit and the exclusive
/// upper bound cannot be represented.
fn timestamp_bounds(start: NaiveDate, end: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let upper = end.checked_add_days(Days::new(1))?;
    Some((
        start.and_time(NaiveTime::MIN).and_utc(),
        upper.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// Start of the fixed three-calendar-month rollup window ending at `end`.
fn monthly_window_start(end: NaiveDate) -> NaiveDate {
    end - Months::new(3)
}

// ---

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    days: Option<i64>,
}

async fn farm_analytics(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let now = Utc::now();
    let days = lookback_days(params.days, 30);
    let range_start = now.date_naive() - Duration::days(days);
    let range_end = now.date_naive();

    let readings =
        match store::fetch_readings_since(&pool, id, now - Duration::days(days)).await {
            Ok(readings) => readings,
            Err(e) => return db_failure("failed to load sensor readings", e),
        };

    let reports = match store::fetch_reports_between(&pool, id, range_start, range_end).await {
        Ok(reports) => reports,
        Err(e) => return db_failure("failed to load manual reports", e),
    };

    // Rollups use fixed windows regardless of `days`: four weeks for the
    // weekly view, three months for the monthly view.
    let weekly_start = now.date_naive() - Duration::weeks(4);
    let weekly_reports =
        match store::fetch_reports_between(&pool, id, weekly_start, range_end).await {
            Ok(reports) => reports,
            Err(e) => return db_failure("failed to load manual reports", e),
        };
    let monthly_start = monthly_window_start(range_end);
    let monthly_reports =
        match store::fetch_reports_between(&pool, id, monthly_start, range_end).await {
            Ok(reports) => reports,
            Err(e) => return db_failure("failed to load manual reports", e),
        };

    ok_json(json!({
        "period_days": days,
        "sensor_trends": daily_averages(&readings, now, days),
        "weekly_summary": weekly_summary(&weekly_reports),
        "monthly_summary": monthly_summary(&monthly_reports),
        "totals": totals(&reports),
        "fcr": fcr(
            &reports,
            farm.initial_population,
            farm.initial_weight,
            range_start,
            now,
        ),
        "mortality_rate": mortality_rate(&reports, farm.initial_population),
    }))
}

// ---

async fn farm_reports(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(params): Query<RangeQuery>,
) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let (start, end) = params.resolve(Utc::now());

    let reports = match store::fetch_reports_between(&pool, id, start, end).await {
        Ok(reports) => reports,
        Err(e) => return db_failure("failed to load manual reports", e),
    };
    let config = match store::fetch_threshold_config(&pool, id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };
    let thresholds = config.resolve();

    // Newest first for display.
    let rows: Vec<_> = reports
        .iter()
        .rev()
        .map(|report| {
            json!({
                "id": report.id,
                "report_date": report.report_date,
                "feed_consumed": report.feed_consumed,
                "water_consumed": report.water_consumed,
                "deaths": report.deaths,
                "user_id": report.user_id,
                "warnings": report_warnings(report, &thresholds, farm.initial_population),
            })
        })
        .collect();

    ok_json(json!(rows))
}

// ---

async fn farm_statistics(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(params): Query<RangeQuery>,
) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let now = Utc::now();
    let (start, end) = params.resolve(now);
    let Some((ts_start, ts_end)) = timestamp_bounds(start, end) else {
        return fail_json(StatusCode::UNPROCESSABLE_ENTITY, "end_date out of range");
    };

    let readings = match store::fetch_readings_between(&pool, id, ts_start, ts_end).await {
        Ok(readings) => readings,
        Err(e) => return db_failure("failed to load sensor readings", e),
    };
    let reports = match store::fetch_reports_between(&pool, id, start, end).await {
        Ok(reports) => reports,
        Err(e) => return db_failure("failed to load manual reports", e),
    };

    ok_json(statistics_payload(&farm, &readings, &reports, start, now))
}

fn statistics_payload(
    farm: &Farm,
    readings: &[crate::models::SensorReading],
    reports: &[crate::models::ManualReport],
    range_start: NaiveDate,
    now: DateTime<Utc>,
) -> serde_json::Value {
    // ---
    json!({
        "sensor_statistics": stats(readings),
        "manual_data_totals": totals(reports),
        "fcr": fcr(
            reports,
            farm.initial_population,
            farm.initial_weight,
            range_start,
            now,
        ),
        "mortality_rate": mortality_rate(reports, farm.initial_population),
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn timestamp_bounds_cover_the_full_end_day() {
        // ---
        let (start, end) = timestamp_bounds(date(2026, 8, 1), date(2026, 8, 28)).unwrap();
        assert_eq!(start, date(2026, 8, 1).and_time(NaiveTime::MIN).and_utc());
        assert_eq!(end, date(2026, 8, 29).and_time(NaiveTime::MIN).and_utc());
    }

    #[test]
    fn timestamp_bounds_reject_end_date_at_calendar_limit() {
        // ---
        assert!(timestamp_bounds(date(2026, 8, 1), NaiveDate::MAX).is_none());
    }

    #[test]
    fn monthly_window_spans_calendar_months_not_ninety_days() {
        // ---
        assert_eq!(monthly_window_start(date(2026, 8, 28)), date(2026, 5, 28));
        // Across three 31-day months the calendar window reaches further
        // back than a flat 90-day one would.
        let start = monthly_window_start(date(2025, 10, 31));
        assert_eq!(start, date(2025, 7, 31));
        assert!(start < date(2025, 10, 31) - Duration::days(90));
    }
}
