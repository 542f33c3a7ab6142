//! Sensor-data ingestion endpoint for IoT devices.
//!
//! `POST /iot/sensor-data` stores one reading with a server-side timestamp
//! and immediately classifies it against the farm's thresholds, so the
//! device response carries the resulting farm status and whether the
//! reading breached a critical bound. Notification dispatch for critical
//! readings is out of scope here; they are logged for the operator.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::eval::status::{classify, is_critical};
use crate::models::{status_color, SensorReading};
use crate::store;

use super::{created_json, db_failure, fail_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new().route("/iot/sensor-data", post(handler))
}

#[derive(Debug, Deserialize)]
struct SensorPayload {
    farm_id: i64,
    temperature: f64,
    humidity: f64,
    ammonia: f64,
}

impl SensorPayload {
    /// Declared measurement ranges; values outside are rejected with 422.
    fn validate(&self) -> Result<(), &'static str> {
        // ---
        if !(-50.0..=100.0).contains(&self.temperature) {
            return Err("temperature must be between -50 and 100");
        }
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err("humidity must be between 0 and 100");
        }
        if !(0.0..=1000.0).contains(&self.ammonia) {
            return Err("ammonia must be between 0 and 1000");
        }
        Ok(())
    }
}

async fn handler(
    State(pool): State<PgPool>,
    Json(payload): Json<SensorPayload>,
) -> impl IntoResponse {
    // ---
    info!("POST /iot/sensor-data - farm {}", payload.farm_id);

    if let Err(message) = payload.validate() {
        return fail_json(StatusCode::UNPROCESSABLE_ENTITY, message);
    }

    let farm = match require_farm(&pool, payload.farm_id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    let reading = SensorReading {
        farm_id: payload.farm_id,
        timestamp: Utc::now(),
        temperature: payload.temperature,
        humidity: payload.humidity,
        ammonia: payload.ammonia,
        data_source: "IOT".to_string(),
    };

    let id = match store::insert_reading(&pool, &reading).await {
        Ok(id) => id,
        Err(e) => return db_failure("failed to store sensor reading", e),
    };

    let config = match store::fetch_threshold_config(&pool, payload.farm_id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };

    let classification = classify(Some(&reading), &config);
    let critical = is_critical(&reading, &config);

    if critical {
        warn!(
            farm_id = farm.farm_id,
            farm_name = %farm.farm_name,
            temperature = reading.temperature,
            humidity = reading.humidity,
            ammonia = reading.ammonia,
            "critical sensor conditions detected"
        );
    }

    created_json(json!({
        "id": id,
        "farm_id": reading.farm_id,
        "timestamp": reading.timestamp,
        "temperature": reading.temperature,
        "humidity": reading.humidity,
        "ammonia": reading.ammonia,
        "farm_status": classification.aggregate,
        "status_color": status_color(classification.aggregate.as_str()),
        "is_critical": critical,
        "parameter_status": classification.parameters,
    }))
}
