use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: i32,
    pub sensor_id: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub created_at: DateTime<Utc>,
}

/// A sensor together with its most recent reading, as pushed to the tables.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_data: Option<SensorReading>,
}

/// Flat row of `sensors LEFT JOIN LATERAL <latest reading>`.
#[derive(Debug, FromRow)]
pub struct SensorWithLatestRow {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reading_id: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub reading_created_at: Option<DateTime<Utc>>,
}

impl From<SensorWithLatestRow> for SensorSnapshot {
    fn from(row: SensorWithLatestRow) -> Self {
        let latest_data = match (
            row.reading_id,
            row.temperature,
            row.humidity,
            row.reading_created_at,
        ) {
            (Some(id), Some(temperature), Some(humidity), Some(created_at)) => {
                Some(SensorReading {
                    id,
                    sensor_id: row.id,
                    temperature,
                    humidity,
                    created_at,
                })
            }
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            latest_data,
        }
    }
}
