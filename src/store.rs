//! Data-access helpers shared by the route handlers.
//!
//! Persistence is deliberately thin: each helper materializes a
//! point-in-time snapshot of one farm's rows and hands it to the pure
//! `eval` functions. No business rules live here beyond row shapes and
//! the unique keys the schema enforces.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::eval::thresholds::{ThresholdConfig, Thresholds};
use crate::models::{Farm, ManualReport, SensorReading};

// ---

pub async fn fetch_farm(pool: &PgPool, farm_id: i64) -> Result<Option<Farm>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Farm>(
        r#"
        SELECT farm_id, farm_name, location, initial_population, initial_weight
        FROM farms
        WHERE farm_id = $1
        "#,
    )
    .bind(farm_id)
    .fetch_optional(pool)
    .await
}

/// Load a farm's stored threshold parameters as a sparse config map.
pub async fn fetch_threshold_config(
    pool: &PgPool,
    farm_id: i64,
) -> Result<ThresholdConfig, sqlx::Error> {
    // ---
    let rows: Vec<(String, f64)> = sqlx::query_as(
        r#"
        SELECT parameter_name, value
        FROM farm_config
        WHERE farm_id = $1
        "#,
    )
    .bind(farm_id)
    .fetch_all(pool)
    .await?;

    Ok(ThresholdConfig::from_pairs(rows))
}

/// Upsert one threshold parameter; last write wins.
pub async fn upsert_threshold(
    pool: &PgPool,
    farm_id: i64,
    name: &str,
    value: f64,
) -> Result<(), sqlx::Error> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO farm_config (farm_id, parameter_name, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (farm_id, parameter_name) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(farm_id)
    .bind(name)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace a farm's configuration with the documented defaults.
pub async fn reset_threshold_config(pool: &PgPool, farm_id: i64) -> Result<(), sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM farm_config WHERE farm_id = $1")
        .bind(farm_id)
        .execute(&mut *tx)
        .await?;

    for (name, value) in Thresholds::default().pairs() {
        sqlx::query(
            r#"
            INSERT INTO farm_config (farm_id, parameter_name, value)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(farm_id)
        .bind(name)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

// ---

pub async fn fetch_latest_reading(
    pool: &PgPool,
    farm_id: i64,
) -> Result<Option<SensorReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, SensorReading>(
        r#"
        SELECT farm_id, timestamp, temperature, humidity, ammonia, data_source
        FROM iot_data
        WHERE farm_id = $1
        ORDER BY timestamp DESC
        LIMIT 1
        "#,
    )
    .bind(farm_id)
    .fetch_optional(pool)
    .await
}

/// Readings at or after `since`, oldest first.
pub async fn fetch_readings_since(
    pool: &PgPool,
    farm_id: i64,
    since: DateTime<Utc>,
) -> Result<Vec<SensorReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, SensorReading>(
        r#"
        SELECT farm_id, timestamp, temperature, humidity, ammonia, data_source
        FROM iot_data
        WHERE farm_id = $1 AND timestamp >= $2
        ORDER BY timestamp ASC
        "#,
    )
    .bind(farm_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Readings within the half-open interval `[start, end)`, oldest first.
pub async fn fetch_readings_between(
    pool: &PgPool,
    farm_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<SensorReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, SensorReading>(
        r#"
        SELECT farm_id, timestamp, temperature, humidity, ammonia, data_source
        FROM iot_data
        WHERE farm_id = $1 AND timestamp >= $2 AND timestamp < $3
        ORDER BY timestamp ASC
        "#,
    )
    .bind(farm_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn insert_reading(
    pool: &PgPool,
    reading: &SensorReading,
) -> Result<i64, sqlx::Error> {
    // ---
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO iot_data (farm_id, timestamp, temperature, humidity, ammonia, data_source)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(reading.farm_id)
    .bind(reading.timestamp)
    .bind(reading.temperature)
    .bind(reading.humidity)
    .bind(reading.ammonia)
    .bind(&reading.data_source)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

// ---

/// Manual reports with `report_date` in `[start, end]`, oldest first.
pub async fn fetch_reports_between(
    pool: &PgPool,
    farm_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ManualReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, ManualReport>(
        r#"
        SELECT id, farm_id, user_id, report_date, feed_consumed, water_consumed, deaths
        FROM manual_data
        WHERE farm_id = $1 AND report_date BETWEEN $2 AND $3
        ORDER BY report_date ASC
        "#,
    )
    .bind(farm_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn fetch_report(pool: &PgPool, id: i64) -> Result<Option<ManualReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, ManualReport>(
        r#"
        SELECT id, farm_id, user_id, report_date, feed_consumed, water_consumed, deaths
        FROM manual_data
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a daily report. Fails with a unique violation when a report for
/// the same `(farm_id, report_date)` already exists.
pub async fn insert_report(
    pool: &PgPool,
    farm_id: i64,
    user_id: i64,
    report_date: NaiveDate,
    feed_consumed: f64,
    water_consumed: f64,
    deaths: i64,
) -> Result<i64, sqlx::Error> {
    // ---
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO manual_data (farm_id, user_id, report_date, feed_consumed, water_consumed, deaths)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(farm_id)
    .bind(user_id)
    .bind(report_date)
    .bind(feed_consumed)
    .bind(water_consumed)
    .bind(deaths)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Correct the amounts of an existing report. The `(farm_id, report_date)`
/// key is immutable after creation.
pub async fn update_report_amounts(
    pool: &PgPool,
    id: i64,
    feed_consumed: f64,
    water_consumed: f64,
    deaths: i64,
) -> Result<Option<ManualReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, ManualReport>(
        r#"
        UPDATE manual_data
        SET feed_consumed = $2, water_consumed = $3, deaths = $4
        WHERE id = $1
        RETURNING id, farm_id, user_id, report_date, feed_consumed, water_consumed, deaths
        "#,
    )
    .bind(id)
    .bind(feed_consumed)
    .bind(water_consumed)
    .bind(deaths)
    .fetch_optional(pool)
    .await
}

// ---

pub async fn insert_farm(
    pool: &PgPool,
    farm_name: &str,
    location: Option<&str>,
    initial_population: Option<i64>,
    initial_weight: Option<f64>,
) -> Result<i64, sqlx::Error> {
    // ---
    let (farm_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO farms (farm_name, location, initial_population, initial_weight)
        VALUES ($1, $2, $3, $4)
        RETURNING farm_id
        "#,
    )
    .bind(farm_name)
    .bind(location)
    .bind(initial_population)
    .bind(initial_weight)
    .fetch_one(pool)
    .await?;

    Ok(farm_id)
}
