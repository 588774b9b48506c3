use crate::models::system_info::{
    Disk, Gpu, MemorySample, Network, SystemInfo, SystemInfoSnapshot,
};
use crate::queries::processes::count_processes_for;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub async fn get_latest_system_info(pool: &PgPool) -> Result<Option<SystemInfo>> {
    let row = sqlx::query_as::<_, SystemInfo>(
        r#"
        SELECT *
        FROM system_info
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Newest telemetry pass with disks, GPUs, networks and its process count.
pub async fn get_latest_system_snapshot(pool: &PgPool) -> Result<Option<SystemInfoSnapshot>> {
    let Some(info) = get_latest_system_info(pool).await? else {
        return Ok(None);
    };

    let disks = sqlx::query_as::<_, Disk>("SELECT * FROM disks WHERE system_info_id = $1 ORDER BY id")
        .bind(info.id)
        .fetch_all(pool)
        .await?;

    let gpus = sqlx::query_as::<_, Gpu>("SELECT * FROM gpus WHERE system_info_id = $1 ORDER BY id")
        .bind(info.id)
        .fetch_all(pool)
        .await?;

    let networks =
        sqlx::query_as::<_, Network>("SELECT * FROM networks WHERE system_info_id = $1 ORDER BY id")
            .bind(info.id)
            .fetch_all(pool)
            .await?;

    let process_count = count_processes_for(pool, info.id).await?;

    Ok(Some(SystemInfoSnapshot {
        info,
        disks,
        gpus,
        networks,
        process_count,
    }))
}

/// Newest `limit` memory samples inside `[from, to]`, newest first.
pub async fn get_memory_samples_between(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<MemorySample>> {
    let samples = sqlx::query_as::<_, MemorySample>(
        r#"
        SELECT id, total_ram, used_ram, created_at
        FROM system_info
        WHERE created_at >= $1
          AND created_at <= $2
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(samples)
}

pub async fn count_system_info(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM system_info")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
