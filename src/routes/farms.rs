//! Farm provisioning endpoints.
//!
//! Creating a farm also seeds its threshold configuration with the
//! documented defaults, so a freshly provisioned farm classifies readings
//! immediately without any manual configuration step.

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get,
    routing::post, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::store;

use super::{created_json, db_failure, fail_json, ok_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new()
        .route("/farms", post(create_farm))
        .route("/farms/{id}", get(show_farm))
}

#[derive(Debug, Deserialize)]
struct CreateFarmPayload {
    farm_name: String,
    location: Option<String>,
    initial_population: Option<i64>,
    initial_weight: Option<f64>,
}

async fn create_farm(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateFarmPayload>,
) -> impl IntoResponse {
    // ---
    if payload.farm_name.trim().is_empty() {
        return fail_json(StatusCode::UNPROCESSABLE_ENTITY, "farm_name is required");
    }
    if payload.initial_population.is_some_and(|p| p < 0) {
        return fail_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            "initial_population must be non-negative",
        );
    }
    if payload.initial_weight.is_some_and(|w| w < 0.0) {
        return fail_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            "initial_weight must be non-negative",
        );
    }

    let farm_id = match store::insert_farm(
        &pool,
        payload.farm_name.trim(),
        payload.location.as_deref(),
        payload.initial_population,
        payload.initial_weight,
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return db_failure("failed to create farm", e),
    };

    if let Err(e) = store::reset_threshold_config(&pool, farm_id).await {
        return db_failure("failed to seed default config", e);
    }

    info!("created farm {} ({})", farm_id, payload.farm_name.trim());

    created_json(json!({
        "farm_id": farm_id,
        "farm_name": payload.farm_name.trim(),
        "location": payload.location,
        "initial_population": payload.initial_population,
        "initial_weight": payload.initial_weight,
    }))
}

async fn show_farm(State(pool): State<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    // ---
    let farm = match require_farm(&pool, id).await {
        Ok(farm) => farm,
        Err(response) => return response,
    };

    ok_json(json!(farm))
}
