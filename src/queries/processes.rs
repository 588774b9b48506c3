use crate::models::processes::ProcessSample;
use crate::models::search::SearchKey;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Processes attached to the newest `system_info` row. A search key matches
/// the name (case-insensitive substring) or, when it is an integer, the pid.
pub async fn get_current_processes(
    pool: &PgPool,
    search: Option<&SearchKey>,
) -> Result<Vec<ProcessSample>> {
    let processes = sqlx::query_as::<_, ProcessSample>(
        r#"
        SELECT p.id, p.system_info_id, p.name, p.pid, p.memory, p.cpu_usage, p.created_at
        FROM processes p
        WHERE p.system_info_id = (
                SELECT id FROM system_info
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
          AND ($1::TEXT IS NULL
               OR p.name ILIKE $1
               OR ($2::INTEGER IS NOT NULL AND p.pid = $2))
        ORDER BY p.created_at DESC, p.id
        "#,
    )
    .bind(search.map(SearchKey::like_pattern))
    .bind(search.and_then(|k| k.integer))
    .fetch_all(pool)
    .await?;

    Ok(processes)
}

/// Newest `limit` samples of a process name (case-insensitive) inside `[from, to]`.
pub async fn get_process_samples_between(
    pool: &PgPool,
    name: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<ProcessSample>> {
    let samples = sqlx::query_as::<_, ProcessSample>(
        r#"
        SELECT id, system_info_id, name, pid, memory, cpu_usage, created_at
        FROM processes
        WHERE LOWER(name) = LOWER($1)
          AND created_at >= $2
          AND created_at <= $3
        ORDER BY created_at DESC, id DESC
        LIMIT $4
        "#,
    )
    .bind(name)
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(samples)
}

pub async fn count_processes_for(pool: &PgPool, system_info_id: i32) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processes WHERE system_info_id = $1")
        .bind(system_info_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tests::TestDatabase;
    use chrono::Duration;

    const SEED: &str = r#"
        INSERT INTO system_info
            (id, manufacturer, model, os_name, os_arch, os_release, cpu_brand, cpu_manufacturer, created_at)
        VALUES
            (1, 'Dell', 'OptiPlex', 'Ubuntu', 'x64', '24.04', 'Core i5', 'Intel', NOW() - INTERVAL '1 hour'),
            (2, 'Dell', 'OptiPlex', 'Ubuntu', 'x64', '24.04', 'Core i5', 'Intel', NOW());

        INSERT INTO processes (system_info_id, name, pid, memory, cpu_usage) VALUES
            (1, 'stale42', 42, 1.0, 0.1),
            (2, 'init', 42, 4.0, 0.0),
            (2, 'worker42', 7, 64.0, 3.5),
            (2, 'cron', 420, 2.0, 0.0),
            (2, 'System Idle', 0, 0.0, 92.0),
            (2, '50%off', 9, 8.0, 0.2),
            (2, '5000off', 11, 8.0, 0.2),
            (2, 'a_b', 12, 1.0, 0.0),
            (2, 'axb', 13, 1.0, 0.0);
    "#;

    async fn names(pool: &PgPool, key: Option<&str>) -> Vec<String> {
        let key = SearchKey::parse(key);
        let mut names: Vec<String> = get_current_processes(pool, key.as_ref())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_current_processes_come_from_newest_system_info() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        let all = names(&db.pool, None).await;
        assert_eq!(all.len(), 8);
        assert!(!all.contains(&"stale42".to_string()));
        assert_eq!(count_processes_for(&db.pool, 2).await.unwrap(), 8);

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_integer_key_matches_pid_or_name() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        // pid 42 or a name containing "42"; pid 420 is not a match
        assert_eq!(names(&db.pool, Some("42")).await, vec!["init", "worker42"]);

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_text_key_matches_names_only() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        assert_eq!(names(&db.pool, Some("idle")).await, vec!["System Idle"]);
        assert_eq!(names(&db.pool, Some("IDLE")).await, vec!["System Idle"]);
        assert!(names(&db.pool, Some("postgres")).await.is_empty());

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_like_metacharacters_match_literally() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        assert_eq!(names(&db.pool, Some("%")).await, vec!["50%off"]);
        assert_eq!(names(&db.pool, Some("_")).await, vec!["a_b"]);

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_chart_samples_match_name_case_insensitively() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        let now = Utc::now();
        let samples = get_process_samples_between(
            &db.pool,
            "WORKER42",
            now - Duration::hours(1),
            now + Duration::hours(1),
            15,
        )
        .await
        .unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].pid, 7);
        assert_eq!(samples[0].cpu_usage, 3.5);

        db.drop_schema().await;
    }
}
