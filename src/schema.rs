//! Database schema management for `ternak-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `farms`, `farm_config`, `iot_data`, and `manual_data`
/// tables. Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS farms (
            farm_id            BIGSERIAL PRIMARY KEY,
            farm_name          TEXT             NOT NULL,
            location           TEXT,
            initial_population BIGINT,
            initial_weight     DOUBLE PRECISION
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Sparse per-farm threshold parameters; last write wins per name.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS farm_config (
            config_id      BIGSERIAL PRIMARY KEY,
            farm_id        BIGINT           NOT NULL REFERENCES farms (farm_id),
            parameter_name TEXT             NOT NULL,
            value          DOUBLE PRECISION NOT NULL,
            UNIQUE (farm_id, parameter_name)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Immutable sensor readings; "latest" is max(timestamp) per farm.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS iot_data (
            id          BIGSERIAL PRIMARY KEY,
            farm_id     BIGINT           NOT NULL REFERENCES farms (farm_id),
            timestamp   TIMESTAMPTZ      NOT NULL,
            temperature DOUBLE PRECISION NOT NULL,
            humidity    DOUBLE PRECISION NOT NULL,
            ammonia     DOUBLE PRECISION NOT NULL,
            data_source TEXT             NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Daily manual reports; at most one per farm and date.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS manual_data (
            id             BIGSERIAL PRIMARY KEY,
            farm_id        BIGINT           NOT NULL REFERENCES farms (farm_id),
            user_id        BIGINT           NOT NULL,
            report_date    DATE             NOT NULL,
            feed_consumed  DOUBLE PRECISION NOT NULL,
            water_consumed DOUBLE PRECISION NOT NULL,
            deaths         BIGINT           NOT NULL,
            UNIQUE (farm_id, report_date)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes for the window and range queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_iot_data_farm_timestamp
            ON iot_data (farm_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_manual_data_farm_date
            ON manual_data (farm_id, report_date);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
