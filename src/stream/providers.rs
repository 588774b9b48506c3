use crate::models::charts::{CoolerChart, MemoryChart, ProcessChart, today_bounds};
use crate::models::search::SearchKey;
use crate::queries;
use crate::stream::error::StreamError;
use anyhow::Context;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

/// One parameterized read behind a topic.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotQuery {
    LatestSensors { search: Option<SearchKey> },
    LatestCoolers { search: Option<SearchKey> },
    CoolerById { id: Option<i32> },
    CoolerChart { id: Option<i32> },
    Processes { search: Option<SearchKey> },
    ProcessChart { name: Option<String> },
    MemoryChart,
    SystemLatest,
}

/// Where publishers read snapshots from.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch<'a>(&'a self, query: &'a SnapshotQuery) -> BoxFuture<'a, Result<Value, StreamError>>;
}

/// Snapshots read straight from Postgres on every call.
#[derive(Debug, Clone)]
pub struct PgSnapshotSource {
    pool: PgPool,
    chart_window: usize,
}

impl PgSnapshotSource {
    pub fn new(pool: PgPool, chart_window: usize) -> Self {
        Self { pool, chart_window }
    }

    async fn load(&self, query: &SnapshotQuery) -> Result<Value, StreamError> {
        let pool = &self.pool;
        let limit = self.chart_window as i64;

        match query {
            SnapshotQuery::LatestSensors { search } => {
                let sensors = queries::sensors::get_latest_sensors(pool, search.as_ref())
                    .await
                    .context("loading latest sensors")?;
                encode(&sensors)
            }
            SnapshotQuery::LatestCoolers { search } => {
                let coolers = queries::coolers::get_latest_coolers(pool, search.as_ref())
                    .await
                    .context("loading latest coolers")?;
                encode(&coolers)
            }
            SnapshotQuery::CoolerById { id: None } => Ok(Value::Null),
            SnapshotQuery::CoolerById { id: Some(id) } => {
                let cooler = queries::coolers::get_latest_cooler_by_id(pool, *id)
                    .await
                    .with_context(|| format!("loading cooler {id}"))?;
                encode(&cooler)
            }
            SnapshotQuery::CoolerChart { id: None } => encode(&CoolerChart::default()),
            SnapshotQuery::CoolerChart { id: Some(id) } => {
                let (from, to) = today_bounds();
                let readings =
                    queries::coolers::get_cooler_readings_between(pool, *id, from, to, limit)
                        .await
                        .with_context(|| format!("loading chart readings for cooler {id}"))?;
                encode(&CoolerChart::from_readings(readings, self.chart_window))
            }
            SnapshotQuery::Processes { search } => {
                let processes = queries::processes::get_current_processes(pool, search.as_ref())
                    .await
                    .context("loading current processes")?;
                encode(&processes)
            }
            SnapshotQuery::ProcessChart { name: None } => encode(&ProcessChart::default()),
            SnapshotQuery::ProcessChart { name: Some(name) } => {
                let (from, to) = today_bounds();
                let samples =
                    queries::processes::get_process_samples_between(pool, name, from, to, limit)
                        .await
                        .with_context(|| format!("loading chart samples for process {name}"))?;
                encode(&ProcessChart::from_samples(samples, self.chart_window))
            }
            SnapshotQuery::MemoryChart => {
                let (from, to) = today_bounds();
                let samples = queries::system_info::get_memory_samples_between(pool, from, to, limit)
                    .await
                    .context("loading memory samples")?;
                encode(&MemoryChart::from_samples(samples, self.chart_window))
            }
            SnapshotQuery::SystemLatest => {
                let snapshot = queries::system_info::get_latest_system_snapshot(pool)
                    .await
                    .context("loading latest system info")?;
                encode(&snapshot)
            }
        }
    }
}

impl SnapshotSource for PgSnapshotSource {
    fn fetch<'a>(&'a self, query: &'a SnapshotQuery) -> BoxFuture<'a, Result<Value, StreamError>> {
        self.load(query).boxed()
    }
}

fn encode<T: Serialize>(snapshot: &T) -> Result<Value, StreamError> {
    Ok(serde_json::to_value(snapshot)?)
}
