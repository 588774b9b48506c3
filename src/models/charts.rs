use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::coolers::CoolerReading;
use crate::models::processes::ProcessSample;
use crate::models::system_info::MemorySample;

/// Default number of points kept in a chart frame.
pub const CHART_WINDOW: usize = 15;

/// Local-day bounds `[00:00:00.000, 23:59:59.999]` for the day containing `now`.
pub fn day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = now.date_naive();
    let start = day.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (local_to_utc(start), local_to_utc(end))
}

pub fn today_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(Local::now())
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    // Midnight can fall into a DST gap; fall back to reading the wall time as UTC.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// `HH:MM:SS` in local time, the label format of every chart.
pub fn time_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Orders rows by `(created_at, id)` and keeps only the newest `window` of them.
pub fn recent_window<T, F>(mut rows: Vec<T>, window: usize, order: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, i32),
{
    rows.sort_by_key(|row| order(row));
    let excess = rows.len().saturating_sub(window);
    rows.drain(..excess);
    rows
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CoolerChart {
    #[serde(rename = "TimeChart")]
    pub time_chart: Vec<String>,
    #[serde(rename = "Speed")]
    pub speed: Vec<i32>,
    #[serde(rename = "Mode")]
    pub mode: Vec<String>,
}

impl CoolerChart {
    pub fn from_readings(readings: Vec<CoolerReading>, window: usize) -> Self {
        let mut chart = Self::default();
        for reading in recent_window(readings, window, |r| (r.created_at, r.id)) {
            chart.time_chart.push(time_label(reading.created_at));
            chart.speed.push(reading.speed);
            chart.mode.push(reading.mode);
        }
        chart
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProcessChart {
    #[serde(rename = "TimeChart")]
    pub time_chart: Vec<String>,
    #[serde(rename = "CPUUsage")]
    pub cpu_usage: Vec<f64>,
    #[serde(rename = "Memory")]
    pub memory: Vec<f64>,
}

impl ProcessChart {
    pub fn from_samples(samples: Vec<ProcessSample>, window: usize) -> Self {
        let mut chart = Self::default();
        for sample in recent_window(samples, window, |s| (s.created_at, s.id)) {
            chart.time_chart.push(time_label(sample.created_at));
            chart.cpu_usage.push(sample.cpu_usage);
            chart.memory.push(sample.memory);
        }
        chart
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MemoryChart {
    #[serde(rename = "TimeChart")]
    pub time_chart: Vec<String>,
    #[serde(rename = "TotalRAM")]
    pub total_ram: Vec<f64>,
    #[serde(rename = "UsedRAM")]
    pub used_ram: Vec<f64>,
    #[serde(rename = "AvailableRAM")]
    pub available_ram: Vec<f64>,
}

impl MemoryChart {
    pub fn from_samples(samples: Vec<MemorySample>, window: usize) -> Self {
        let mut chart = Self::default();
        for sample in recent_window(samples, window, |s| (s.created_at, s.id)) {
            chart.time_chart.push(time_label(sample.created_at));
            chart.total_ram.push(sample.total_ram);
            chart.used_ram.push(sample.used_ram);
            chart.available_ram.push(sample.total_ram - sample.used_ram);
        }
        chart
    }
}
