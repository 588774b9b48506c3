use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use sqlx::PgPool;

use crate::queries::coolers::count_coolers;
use crate::queries::sensors::count_sensors;
use crate::queries::system_info::count_system_info;

pub async fn status(State(pool): State<PgPool>) -> Json<Value> {
    let db_status = match sqlx::query("SELECT 1 as health_check")
        .fetch_one(&pool)
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let (total_sensors, total_coolers, telemetry_samples) = get_basic_stats(&pool).await;

    Json(json!({
        "service": "Fleetwatch",
        "status": "running",
        "database": db_status,
        "stats": {
            "total_sensors": total_sensors,
            "total_coolers": total_coolers,
            "telemetry_samples": telemetry_samples
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_basic_stats(pool: &PgPool) -> (i64, i64, i64) {
    let sensors = count_sensors(pool).await.unwrap_or(0);
    let coolers = count_coolers(pool).await.unwrap_or(0);
    let samples = count_system_info(pool).await.unwrap_or(0);

    (sensors, coolers, samples)
}
