use axum::{
    http::StatusCode, response::IntoResponse, response::Response, Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::error;

use crate::models::Farm;
use crate::store;

mod analytics;
mod farm_config;
mod farms;
mod health;
mod ingest;
mod manual_reports;
mod monitoring;

// ---

pub fn router(pool: PgPool) -> Router {
    // ---
    Router::new()
        .merge(ingest::router())
        .merge(farms::router())
        .merge(monitoring::router())
        .merge(analytics::router())
        .merge(farm_config::router())
        .merge(manual_reports::router())
        .merge(health::router())
        .with_state(pool)
}

// ---

/// `{"success": true, "data": ...}` envelope used by every read endpoint.
pub(crate) fn ok_json(data: serde_json::Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

pub(crate) fn created_json(data: serde_json::Value) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

pub(crate) fn fail_json(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Log a database failure and return a generic 500.
pub(crate) fn db_failure(context: &str, e: sqlx::Error) -> Response {
    // ---
    error!("{context}: {e}");
    fail_json(StatusCode::INTERNAL_SERVER_ERROR, "database error")
}

/// Load a farm or produce the 404 response for the handler to return.
pub(crate) async fn require_farm(pool: &PgPool, farm_id: i64) -> Result<Farm, Response> {
    // ---
    match store::fetch_farm(pool, farm_id).await {
        Ok(Some(farm)) => Ok(farm),
        Ok(None) => Err(fail_json(StatusCode::NOT_FOUND, "farm not found")),
        Err(e) => Err(db_failure("failed to load farm", e)),
    }
}

/// Lookback window from a `days` query parameter, clamped to one year.
/// Unclamped values would overflow the date arithmetic in the handlers.
pub(crate) fn lookback_days(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, 365)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn lookback_days_defaults_and_clamps() {
        // ---
        assert_eq!(lookback_days(None, 30), 30);
        assert_eq!(lookback_days(Some(7), 30), 7);
        assert_eq!(lookback_days(Some(0), 7), 1);
        assert_eq!(lookback_days(Some(-5), 7), 1);
        assert_eq!(lookback_days(Some(400), 30), 365);
        assert_eq!(lookback_days(Some(i64::MAX), 30), 365);
    }

    #[test]
    fn clamped_window_arithmetic_stays_in_range() {
        // ---
        // An i64::MAX query value must not be able to overflow the
        // window subtraction once clamped.
        let days = lookback_days(Some(i64::MAX), 30);
        let now = Utc::now();
        let _ = now - Duration::days(days);
        let _ = now.date_naive() - Duration::days(days);
    }
}
