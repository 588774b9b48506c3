use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One process as seen by a telemetry pass; belongs to exactly one `system_info` row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub id: i32,
    pub system_info_id: i32,
    pub name: String,
    pub pid: i32,
    /// Resident memory in MB
    pub memory: f64,
    /// CPU usage in percent
    pub cpu_usage: f64,
    pub created_at: DateTime<Utc>,
}
