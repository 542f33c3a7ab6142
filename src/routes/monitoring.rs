//! Real-time monitoring endpoints: farm status, latest reading, and
//! bucketed sensor history.

use axum::{
    extract::Path, extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::get, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::debug;

use crate::eval::series::{daily_averages, hourly_averages};
use crate::eval::status::{classify, is_critical};
use crate::models::status_color;
use crate::store;

use super::{db_failure, fail_json, ok_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new()
        .route("/farms/{id}/status", get(farm_status))
        .route("/farms/{id}/latest-sensor", get(latest_sensor))
        .route("/farms/{id}/sensor-history", get(sensor_history))
}

async fn farm_status(State(pool): State<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let latest = match store::fetch_latest_reading(&pool, id).await {
        Ok(latest) => latest,
        Err(e) => return db_failure("failed to load latest reading", e),
    };
    let config = match store::fetch_threshold_config(&pool, id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };

    let classification = classify(latest.as_ref(), &config);

    let latest_sensor = latest.map(|reading| {
        json!({
            "temperature": reading.temperature,
            "humidity": reading.humidity,
            "ammonia": reading.ammonia,
            "timestamp": reading.timestamp,
            "parameter_status": classification.parameters,
        })
    });

    ok_json(json!({
        "farm_id": farm.farm_id,
        "farm_name": farm.farm_name,
        "status": classification.aggregate,
        "status_color": status_color(classification.aggregate.as_str()),
        "latest_sensor": latest_sensor,
    }))
}

async fn latest_sensor(State(pool): State<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    // ---
    if let Err(response) = require_farm(&pool, id).await {
        return response;
    }

    let latest = match store::fetch_latest_reading(&pool, id).await {
        Ok(Some(latest)) => latest,
        Ok(None) => {
            return fail_json(StatusCode::NOT_FOUND, "no sensor data for this farm");
        }
        Err(e) => return db_failure("failed to load latest reading", e),
    };

    let config = match store::fetch_threshold_config(&pool, id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };

    let classification = classify(Some(&latest), &config);

    ok_json(json!({
        "temperature": latest.temperature,
        "humidity": latest.humidity,
        "ammonia": latest.ammonia,
        "timestamp": latest.timestamp,
        "parameter_status": classification.parameters,
        "is_critical": is_critical(&latest, &config),
    }))
}

// ---

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    period: Option<String>,
}

async fn sensor_history(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(params): Query<HistoryQuery>,
) -> impl IntoResponse {
    // ---
    if let Err(response) = require_farm(&pool, id).await {
        return response;
    }

    let now = Utc::now();
    let period = params.period.as_deref().unwrap_or("24hours");
    debug!("GET /farms/{id}/sensor-history period={period}");

    // Hour windows bucket hourly, day windows bucket daily.
    let (window_hours, daily_days) = match period {
        "1hour" => (1, None),
        "24hours" => (24, None),
        "7days" => (24 * 7, Some(7)),
        "30days" => (24 * 30, Some(30)),
        _ => (24, None),
    };

    let readings = match store::fetch_readings_since(
        &pool,
        id,
        now - chrono::Duration::hours(window_hours),
    )
    .await
    {
        Ok(readings) => readings,
        Err(e) => return db_failure("failed to load sensor history", e),
    };

    let buckets = match daily_days {
        Some(days) => daily_averages(&readings, now, days),
        None => hourly_averages(&readings, now, window_hours),
    };

    ok_json(json!({
        "period": period,
        "buckets": buckets,
    }))
}
