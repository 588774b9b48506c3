use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    // ───── Identification ─────
    pub id: i32,
    pub manufacturer: String,
    pub model: String,
    pub bios_vendor: Option<String>,
    pub bios_version: Option<String>,
    pub baseboard_model: Option<String>,
    pub baseboard_vendor: Option<String>,

    // ───── Operating System ─────
    pub os_name: String,
    pub os_arch: String,
    pub os_release: String,

    // ───── CPU ─────
    pub cpu_brand: String,
    pub cpu_manufacturer: String,
    pub cpu_speed: f64,
    pub cpu_cores: i32,
    pub cpu_temperature: Option<f64>,

    // ───── Memory (GB) ─────
    #[serde(rename = "totalRAM")]
    pub total_ram: f64,
    #[serde(rename = "usedRAM")]
    pub used_ram: f64,

    // ───── Power ─────
    pub battery_level: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub is_charging: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub id: i32,
    pub system_info_id: i32,
    pub name: String,
    pub size: f64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub disk_type: Option<String>,
    pub used: f64,
    pub free: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    pub id: i32,
    pub system_info_id: i32,
    pub vendor: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub usage: Option<f64>,
    pub memory: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: i32,
    pub system_info_id: i32,
    pub interface: String,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    /// KB/s
    pub rx_speed: f64,
    /// KB/s
    pub tx_speed: f64,
    pub created_at: DateTime<Utc>,
}

/// The newest telemetry pass with its hardware collections and process count.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoSnapshot {
    #[serde(flatten)]
    pub info: SystemInfo,
    pub disks: Vec<Disk>,
    pub gpus: Vec<Gpu>,
    pub networks: Vec<Network>,
    pub process_count: i64,
}

/// Memory columns of one telemetry pass, used for the memory chart.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct MemorySample {
    pub id: i32,
    pub total_ram: f64,
    pub used_ram: f64,
    pub created_at: DateTime<Utc>,
}
