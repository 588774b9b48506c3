use crate::models::search::SearchKey;
use crate::models::sensors::{SensorReading, SensorSnapshot, SensorWithLatestRow};
use anyhow::Result;
use sqlx::PgPool;

/// Every sensor with its newest reading. A search key matches the name
/// (case-insensitive substring) or, when numeric, any stored temperature or
/// humidity of that sensor.
pub async fn get_latest_sensors(
    pool: &PgPool,
    search: Option<&SearchKey>,
) -> Result<Vec<SensorSnapshot>> {
    let rows = sqlx::query_as::<_, SensorWithLatestRow>(
        r#"
        SELECT s.id, s.name, s.created_at, s.updated_at,
               r.id AS reading_id, r.temperature, r.humidity,
               r.created_at AS reading_created_at
        FROM sensors s
        LEFT JOIN LATERAL (
            SELECT id, temperature, humidity, created_at
            FROM sensor_readings
            WHERE sensor_id = s.id
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        ) r ON TRUE
        WHERE $1::TEXT IS NULL
           OR s.name ILIKE $1
           OR ($2::DOUBLE PRECISION IS NOT NULL AND EXISTS (
                SELECT 1 FROM sensor_readings x
                WHERE x.sensor_id = s.id
                  AND (x.temperature = $2 OR x.humidity = $2)
           ))
        ORDER BY s.id
        "#,
    )
    .bind(search.map(SearchKey::like_pattern))
    .bind(search.and_then(|k| k.number))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SensorSnapshot::from).collect())
}

pub async fn sensor_exists(pool: &PgPool, id: i32) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sensors WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn insert_sensor_reading(
    pool: &PgPool,
    sensor_id: i32,
    temperature: f64,
    humidity: f64,
) -> Result<SensorReading> {
    let reading = sqlx::query_as::<_, SensorReading>(
        r#"
        INSERT INTO sensor_readings (sensor_id, temperature, humidity)
        VALUES ($1, $2, $3)
        RETURNING id, sensor_id, temperature, humidity, created_at
        "#,
    )
    .bind(sensor_id)
    .bind(temperature)
    .bind(humidity)
    .fetch_one(pool)
    .await?;

    Ok(reading)
}

pub async fn count_sensors(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensors")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
