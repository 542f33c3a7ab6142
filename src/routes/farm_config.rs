//! Threshold configuration endpoints.
//!
//! Stored parameters are sparse; the read endpoint returns both the raw
//! stored map and the effective values after default substitution, so the
//! dashboard can distinguish an explicit setting from a fallback.

use std::collections::BTreeMap;

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get,
    routing::post, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::eval::thresholds::is_recognized_parameter;
use crate::store;

use super::{db_failure, fail_json, ok_json, require_farm};

// ---

pub fn router() -> Router<PgPool> {
    // ---
    Router::new()
        .route("/farms/{id}/config", get(get_config).put(update_config))
        .route("/farms/{id}/config/reset", post(reset_config))
}

async fn get_config(State(pool): State<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    // ---
    if let Err(response) = require_farm(&pool, id).await {
        return response;
    }

    let config = match store::fetch_threshold_config(&pool, id).await {
        Ok(config) => config,
        Err(e) => return db_failure("failed to load threshold config", e),
    };

    let stored: BTreeMap<&str, f64> = config.iter().collect();
    let effective: BTreeMap<&str, f64> = config.resolve().pairs().into_iter().collect();

    ok_json(json!({
        "stored": stored,
        "effective": effective,
    }))
}

#[derive(Debug, Deserialize)]
struct UpdateConfigPayload {
    parameters: BTreeMap<String, f64>,
}

async fn update_config(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateConfigPayload>,
) -> impl IntoResponse {
    // ---
    if let Err(response) = require_farm(&pool, id).await {
        return response;
    }

    let unknown: Vec<&str> = payload
        .parameters
        .keys()
        .map(String::as_str)
        .filter(|name| !is_recognized_parameter(name))
        .collect();
    if !unknown.is_empty() {
        return fail_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("unrecognized parameters: {}", unknown.join(", ")),
        );
    }

    for (name, value) in &payload.parameters {
        if let Err(e) = store::upsert_threshold(&pool, id, name, *value).await {
            return db_failure("failed to update threshold config", e);
        }
    }

    info!(
        "updated {} config parameter(s) for farm {id}",
        payload.parameters.len()
    );

    ok_json(json!({ "updated": payload.parameters.len() }))
}

async fn reset_config(State(pool): State<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    // ---
    if let Err(response) = require_farm(&pool, id).await {
        return response;
    }

    if let Err(e) = store::reset_threshold_config(&pool, id).await {
        return db_failure("failed to reset threshold config", e);
    }

    info!("reset config for farm {id} to defaults");
    ok_json(json!({ "reset": true }))
}
