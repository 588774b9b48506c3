use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoolerMode {
    #[serde(rename = "DEFAULT")]
    Default,
    #[serde(rename = "ATEMP")]
    Atemp,
    #[serde(rename = "ACLOCK")]
    Aclock,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl CoolerMode {
    /// Speed is only meaningful (and settable) while the cooler is driven manually.
    pub fn allows_manual_speed(&self) -> bool {
        matches!(self, CoolerMode::Manual)
    }
}

impl std::fmt::Display for CoolerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoolerMode::Default => write!(f, "DEFAULT"),
            CoolerMode::Atemp => write!(f, "ATEMP"),
            CoolerMode::Aclock => write!(f, "ACLOCK"),
            CoolerMode::Manual => write!(f, "MANUAL"),
        }
    }
}

impl std::str::FromStr for CoolerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT" => Ok(CoolerMode::Default),
            "ATEMP" => Ok(CoolerMode::Atemp),
            "ACLOCK" => Ok(CoolerMode::Aclock),
            "MANUAL" => Ok(CoolerMode::Manual),
            _ => Err(anyhow::anyhow!("Invalid cooler mode: {}", s)),
        }
    }
}

pub const MAX_SPEED: i32 = 100;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoolerReading {
    pub id: i32,
    pub cooler_id: i32,
    /// One of the `CoolerMode` names, kept as stored
    pub mode: String,
    pub speed: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoolerSnapshot {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_data: Option<CoolerReading>,
}

#[derive(Debug, FromRow)]
pub struct CoolerWithLatestRow {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reading_id: Option<i32>,
    pub mode: Option<String>,
    pub speed: Option<i32>,
    pub reading_created_at: Option<DateTime<Utc>>,
}

impl From<CoolerWithLatestRow> for CoolerSnapshot {
    fn from(row: CoolerWithLatestRow) -> Self {
        let latest_data = match (row.reading_id, row.mode, row.speed, row.reading_created_at) {
            (Some(id), Some(mode), Some(speed), Some(created_at)) => Some(CoolerReading {
                id,
                cooler_id: row.id,
                mode,
                speed,
                created_at,
            }),
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
