//! Daily manual-report endpoints for field workers.
//!
//! One report per farm per day: creation of a duplicate date is rejected
//! with 409 via the unique key, and corrections go through the update
//! endpoint, which can change the amounts but never the farm/date key.
//! Every write responds with the report's current warning flags so the
//! worker sees problems immediately.

use axum::{
    extract::Path, extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::get, routing::put, Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::eval::analytics::report_warnings;
use crate::models::ManualReport;
use crate::store;

use super::{created_json, db_failure, fail_json, lookback_days, ok_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new()
        .route("/manual-data", get(list_reports).post(create_report))
        .route("/manual-data/{id}", put(update_report))
}

#[derive(Debug, Deserialize)]
struct CreateReportPayload {
    farm_id: i64,
    user_id: i64,
    report_date: NaiveDate,
    feed_consumed: f64,
    water_consumed: f64,
    deaths: i64,
}

fn validate_amounts(feed: f64, water: f64, deaths: i64) -> Result<(), &'static str> {
    // ---
    if feed < 0.0 {
        return Err("feed_consumed must be non-negative");
    }
    if water < 0.0 {
        return Err("water_consumed must be non-negative");
    }
    if deaths < 0 {
        return Err("deaths must be non-negative");
    }
    Ok(())
}

async fn report_view(pool: &PgPool, report: &ManualReport) -> Result<serde_json::Value, sqlx::Error> {
    // ---
    let farm = store::fetch_farm(pool, report.farm_id).await?;
    let config = store::fetch_threshold_config(pool, report.farm_id).await?;
    let warnings = report_warnings(
        report,
        &config.resolve(),
        farm.and_then(|f| f.initial_population),
    );

    Ok(json!({
        "id": report.id,
        "farm_id": report.farm_id,
        "user_id": report.user_id,
        "report_date": report.report_date,
        "feed_consumed": report.feed_consumed,
        "water_consumed": report.water_consumed,
        "deaths": report.deaths,
        "warnings": warnings,
    }))
}

async fn create_report(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateReportPayload>,
) -> impl IntoResponse {
    // ---
    if let Err(message) =
        validate_amounts(payload.feed_consumed, payload.water_consumed, payload.deaths)
    {
        return fail_json(StatusCode::UNPROCESSABLE_ENTITY, message);
    }
    if let Err(response) = require_farm(&pool, payload.farm_id).await {
        return response;
    }

    let id = match store::insert_report(
        &pool,
        payload.farm_id,
        payload.user_id,
        payload.report_date,
        payload.feed_consumed,
        payload.water_consumed,
        payload.deaths,
    )
    .await
    {
        Ok(id) => id,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return fail_json(
                StatusCode::CONFLICT,
                "a report already exists for this farm and date",
            );
        }
        Err(e) => return db_failure("failed to store manual report", e),
    };

    info!(
        "manual report {id} stored for farm {} on {}",
        payload.farm_id, payload.report_date
    );

    let report = ManualReport {
        id,
        farm_id: payload.farm_id,
        user_id: payload.user_id,
        report_date: payload.report_date,
        feed_consumed: payload.feed_consumed,
        water_consumed: payload.water_consumed,
        deaths: payload.deaths,
    };

    match report_view(&pool, &report).await {
        Ok(view) => created_json(view),
        Err(e) => db_failure("failed to evaluate report warnings", e),
    }
}

// ---

#[derive(Debug, Deserialize)]
struct UpdateReportPayload {
    feed_consumed: Option<f64>,
    water_consumed: Option<f64>,
    deaths: Option<i64>,
}

async fn update_report(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReportPayload>,
) -> impl IntoResponse {
    // ---
    let existing = match store::fetch_report(&pool, id).await {
        Ok(Some(report)) => report,
        Ok(None) => return fail_json(StatusCode::NOT_FOUND, "report not found"),
        Err(e) => return db_failure("failed to load manual report", e),
    };

    let feed = payload.feed_consumed.unwrap_or(existing.feed_consumed);
    let water = payload.water_consumed.unwrap_or(existing.water_consumed);
    let deaths = payload.deaths.unwrap_or(existing.deaths);

    if let Err(message) = validate_amounts(feed, water, deaths) {
        return fail_json(StatusCode::UNPROCESSABLE_ENTITY, message);
    }

    let updated = match store::update_report_amounts(&pool, id, feed, water, deaths).await {
        Ok(Some(report)) => report,
        Ok(None) => return fail_json(StatusCode::NOT_FOUND, "report not found"),
        Err(e) => return db_failure("failed to update manual report", e),
    };

    match report_view(&pool, &updated).await {
        Ok(view) => ok_json(view),
        Err(e) => db_failure("failed to evaluate report warnings", e),
    }
}

// ---

#[derive(Debug, Deserialize)]
struct ListQuery {
    farm_id: i64,
    days: Option<i64>,
}

async fn list_reports(
    State(pool): State<PgPool>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, params.farm_id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let today = Utc::now().date_naive();
    let days = lookback_days(params.days, 7);
    let reports = match store::fetch_reports_between(
        &pool,
        params.farm_id,
        today - Duration::days(days),
        today,
    )
    .await
    {
        Ok(reports) => reports,
        Err(e) => return db_failure("failed to load manual reports", e),
    };

    let config = match store::fetch_threshold_config(&pool, params.farm_id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };
    let thresholds = config.resolve();

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
                "warnings": report_warnings(report, &thresholds, farm.initial_population),
            })
        })
        .collect();

    ok_json(json!(rows))
}
