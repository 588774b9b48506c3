use crate::models::coolers::{CoolerMode, MAX_SPEED};
use crate::queries::coolers::{cooler_exists, insert_cooler_reading};
use crate::queries::sensors::{insert_sensor_reading, sensor_exists};
use crate::server::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

/// Body a temperature/humidity sensor posts every reading with.
/// Firmware sends numbers either as JSON numbers or as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataPayload {
    pub sensor_id: Option<Value>,
    pub temp: Option<Value>,
    pub humi: Option<Value>,
    pub apikey: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolerDataPayload {
    pub cooler_id: Option<Value>,
    pub mode: Option<String>,
    pub speed: Option<Value>,
    pub apikey: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn missing_fields() -> Response {
    error_response(StatusCode::BAD_REQUEST, "Please fill all required fields")
}

fn device_authorized(state: &AppState, apikey: Option<&str>) -> bool {
    matches!(apikey, Some(key) if !key.is_empty() && key == state.device_api_key())
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// `POST /api/sensor/data`
pub async fn sensor_data(
    State(state): State<AppState>,
    Json(payload): Json<SensorDataPayload>,
) -> Response {
    if !device_authorized(&state, payload.apikey.as_deref()) {
        debug!("rejected sensor reading with bad api key");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let (Some(sensor_id), Some(temp), Some(humi)) = (
        payload.sensor_id.as_ref().and_then(as_i32),
        payload.temp.as_ref().and_then(as_f64),
        payload.humi.as_ref().and_then(as_f64),
    ) else {
        return missing_fields();
    };

    match sensor_exists(state.pool(), sensor_id).await {
        Ok(true) => {}
        Ok(false) => return error_response(StatusCode::NOT_FOUND, "Sensor not found"),
        Err(e) => {
            error!("❌ failed to look up sensor {sensor_id}: {e:?}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    }

    match insert_sensor_reading(state.pool(), sensor_id, temp, humi).await {
        Ok(reading) => {
            info!("🌡️ sensor {sensor_id}: {temp}°C {humi}%");
            (StatusCode::CREATED, Json(reading)).into_response()
        }
        Err(e) => {
            error!("❌ failed to store reading for sensor {sensor_id}: {e:?}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `POST /api/cooler/data`
pub async fn cooler_data(
    State(state): State<AppState>,
    Json(payload): Json<CoolerDataPayload>,
) -> Response {
    if !device_authorized(&state, payload.apikey.as_deref()) {
        debug!("rejected cooler reading with bad api key");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let (Some(cooler_id), Some(mode), Some(speed)) = (
        payload.cooler_id.as_ref().and_then(as_i32),
        payload.mode.as_deref().filter(|m| !m.is_empty()),
        payload.speed.as_ref(),
    ) else {
        return missing_fields();
    };

    let Ok(mode) = mode.parse::<CoolerMode>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid mode value");
    };

    let Some(speed) = as_i32(speed).filter(|s| (0..=MAX_SPEED).contains(s)) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Speed must be between 0 and {MAX_SPEED}"),
        );
    };

    if !mode.allows_manual_speed() && speed != 0 {
        debug!("cooler {cooler_id} reported speed {speed} while in {mode} mode");
    }

    match cooler_exists(state.pool(), cooler_id).await {
        Ok(true) => {}
        Ok(false) => return error_response(StatusCode::NOT_FOUND, "Cooler not found"),
        Err(e) => {
            error!("❌ failed to look up cooler {cooler_id}: {e:?}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    }

    match insert_cooler_reading(state.pool(), cooler_id, mode, speed).await {
        Ok(reading) => {
            info!("🌀 cooler {cooler_id}: {mode} at {speed}%");
            (StatusCode::CREATED, Json(reading)).into_response()
        }
        Err(e) => {
            error!("❌ failed to store reading for cooler {cooler_id}: {e:?}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::test_server;

    #[tokio::test]
    async fn test_sensor_data_requires_api_key() {
        let server = test_server();

        let response = server
            .post("/api/sensor/data")
            .json(&json!({"sensorId": 1, "temp": 21.5, "humi": 40}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "Unauthorized"}));

        let response = server
            .post("/api/sensor/data")
            .json(&json!({"sensorId": 1, "temp": 21.5, "humi": 40, "apikey": "wrong"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sensor_data_missing_fields() {
        let server = test_server();

        let response = server
            .post("/api/sensor/data")
            .json(&json!({"sensorId": 1, "temp": 21.5, "apikey": "device-key"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Please fill all required fields"}));
    }

    #[tokio::test]
    async fn test_cooler_data_rejects_unknown_mode() {
        let server = test_server();

        let response = server
            .post("/api/cooler/data")
            .json(&json!({"coolerId": "3", "mode": "TURBO", "speed": 50, "apikey": "device-key"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid mode value"}));
    }

    #[tokio::test]
    async fn test_cooler_data_rejects_out_of_range_speed() {
        let server = test_server();

        for speed in [json!(101), json!(-1), json!("fast")] {
            let response = server
                .post("/api/cooler/data")
                .json(&json!({"coolerId": 3, "mode": "MANUAL", "speed": speed, "apikey": "device-key"}))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_cooler_data_missing_speed() {
        let server = test_server();

        let response = server
            .post("/api/cooler/data")
            .json(&json!({"coolerId": 3, "mode": "MANUAL", "apikey": "device-key"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Please fill all required fields"}));
    }

    #[test]
    fn test_numbers_accept_strings() {
        assert_eq!(as_i32(&json!("12")), Some(12));
        assert_eq!(as_i32(&json!(12)), Some(12));
        assert_eq!(as_i32(&json!(1.5)), None);
        assert_eq!(as_i32(&json!(null)), None);
        assert_eq!(as_f64(&json!("21.5")), Some(21.5));
        assert_eq!(as_f64(&json!(0)), Some(0.0));
        assert_eq!(as_f64(&json!("NaN")), None);
    }
}
