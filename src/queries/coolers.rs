use crate::models::coolers::{CoolerMode, CoolerReading, CoolerSnapshot, CoolerWithLatestRow};
use crate::models::search::SearchKey;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const LATEST_COOLERS: &str = r#"
    SELECT c.id, c.name, c.created_at, c.updated_at,
           r.id AS reading_id, r.mode, r.speed,
           r.created_at AS reading_created_at
    FROM coolers c
    LEFT JOIN LATERAL (
        SELECT id, mode, speed, created_at
        FROM cooler_readings
        WHERE cooler_id = c.id
        ORDER BY created_at DESC, id DESC
        LIMIT 1
    ) r ON TRUE
"#;

/// Every cooler with its newest reading. A search key matches the name,
/// any recorded mode (uppercased, exact) or, when it is an integer, any
/// recorded speed.
pub async fn get_latest_coolers(
    pool: &PgPool,
    search: Option<&SearchKey>,
) -> Result<Vec<CoolerSnapshot>> {
    let sql = format!(
        r#"{LATEST_COOLERS}
        WHERE $1::TEXT IS NULL
           OR c.name ILIKE $1
           OR EXISTS (
                SELECT 1 FROM cooler_readings x
                WHERE x.cooler_id = c.id
                  AND (x.mode = $2 OR ($3::INTEGER IS NOT NULL AND x.speed = $3))
           )
        ORDER BY c.id
        "#
    );

    let rows = sqlx::query_as::<_, CoolerWithLatestRow>(&sql)
        .bind(search.map(SearchKey::like_pattern))
        .bind(search.map(SearchKey::upper))
        .bind(search.and_then(|k| k.integer))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(CoolerSnapshot::from).collect())
}

pub async fn get_latest_cooler_by_id(pool: &PgPool, id: i32) -> Result<Option<CoolerSnapshot>> {
    let sql = format!("{LATEST_COOLERS} WHERE c.id = $1");
    let row = sqlx::query_as::<_, CoolerWithLatestRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(CoolerSnapshot::from))
}

/// Newest `limit` readings of one cooler inside `[from, to]`, newest first.
pub async fn get_cooler_readings_between(
    pool: &PgPool,
    cooler_id: i32,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<CoolerReading>> {
    let readings = sqlx::query_as::<_, CoolerReading>(
        r#"
        SELECT id, cooler_id, mode, speed, created_at
        FROM cooler_readings
        WHERE cooler_id = $1
          AND created_at >= $2
          AND created_at <= $3
        ORDER BY created_at DESC, id DESC
        LIMIT $4
        "#,
    )
    .bind(cooler_id)
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(readings)
}

pub async fn cooler_exists(pool: &PgPool, id: i32) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM coolers WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn insert_cooler_reading(
    pool: &PgPool,
    cooler_id: i32,
    mode: CoolerMode,
    speed: i32,
) -> Result<CoolerReading> {
    let reading = sqlx::query_as::<_, CoolerReading>(
        r#"
        INSERT INTO cooler_readings (cooler_id, mode, speed)
        VALUES ($1, $2, $3)
        RETURNING id, cooler_id, mode, speed, created_at
        "#,
    )
    .bind(cooler_id)
    .bind(mode.to_string())
    .bind(speed)
    .fetch_one(pool)
    .await?;

    Ok(reading)
}

pub async fn count_coolers(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coolers")
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
        INSERT INTO coolers (id, name) VALUES
            (1, 'north-fan'),
            (2, 'south-fan'),
            (3, 'spare');

        INSERT INTO cooler_readings (cooler_id, mode, speed, created_at) VALUES
            (1, 'MANUAL', 40, NOW()),
            (2, 'MANUAL', 75, NOW() - INTERVAL '1 hour'),
            (2, 'DEFAULT', 0, NOW());
    "#;

    async fn search(pool: &PgPool, key: &str) -> Vec<(i32, Option<String>)> {
        let key = SearchKey::parse(Some(key));
        get_latest_coolers(pool, key.as_ref())
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.latest_data.map(|r| r.mode)))
            .collect()
    }

    #[tokio::test]
    async fn test_mode_search_matches_any_recorded_mode() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        // cooler 2 was MANUAL an hour ago and still matches, showing its current mode
        assert_eq!(
            search(&db.pool, "manual").await,
            vec![
                (1, Some("MANUAL".to_string())),
                (2, Some("DEFAULT".to_string()))
            ]
        );
        assert_eq!(search(&db.pool, "default").await, vec![(2, Some("DEFAULT".to_string()))]);

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_speed_and_name_search() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        assert_eq!(search(&db.pool, "40").await, vec![(1, Some("MANUAL".to_string()))]);
        assert_eq!(search(&db.pool, "75").await, vec![(2, Some("DEFAULT".to_string()))]);
        assert_eq!(search(&db.pool, "SOUTH").await, vec![(2, Some("DEFAULT".to_string()))]);
        assert_eq!(search(&db.pool, "spa").await, vec![(3, None)]);
        assert!(search(&db.pool, "%").await.is_empty());

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_cooler_by_id() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        let cooler = get_latest_cooler_by_id(&db.pool, 1).await.unwrap().unwrap();
        assert_eq!(cooler.name, "north-fan");
        assert_eq!(cooler.latest_data.unwrap().speed, 40);
        assert!(get_latest_cooler_by_id(&db.pool, 99).await.unwrap().is_none());

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_chart_readings_are_newest_first_and_limited() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed("INSERT INTO coolers (id, name) VALUES (7, 'lab-fan');")
            .await;

        let start = Utc::now() - Duration::minutes(5);
        for s in 0..20 {
            sqlx::query(
                "INSERT INTO cooler_readings (cooler_id, mode, speed, created_at) VALUES (7, 'MANUAL', $1, $2)",
            )
            .bind(s * 5)
            .bind(start + Duration::seconds(s as i64))
            .execute(&db.pool)
            .await
            .unwrap();
        }

        let readings = get_cooler_readings_between(
            &db.pool,
            7,
            start - Duration::minutes(1),
            Utc::now() + Duration::minutes(1),
            15,
        )
        .await
        .unwrap();

        assert_eq!(readings.len(), 15);
        assert_eq!(readings.first().unwrap().speed, 95);
        assert_eq!(readings.last().unwrap().speed, 25);

        let outside = get_cooler_readings_between(
            &db.pool,
            7,
            start + Duration::seconds(18),
            start + Duration::seconds(30),
            15,
        )
        .await
        .unwrap();
        assert_eq!(outside.len(), 2);

        db.drop_schema().await;
    }

    #[tokio::test]
    async fn test_insert_reading() {
        let Some(db) = TestDatabase::connect().await else {
            return;
        };
        db.seed(SEED).await;

        assert!(cooler_exists(&db.pool, 3).await.unwrap());
        assert!(!cooler_exists(&db.pool, 4).await.unwrap());

        let reading = insert_cooler_reading(&db.pool, 3, CoolerMode::Atemp, 0).await.unwrap();
        assert_eq!(reading.mode, "ATEMP");

        let spare = get_latest_cooler_by_id(&db.pool, 3).await.unwrap().unwrap();
        assert_eq!(spare.latest_data, Some(reading));
        assert_eq!(count_coolers(&db.pool).await.unwrap(), 3);

        db.drop_schema().await;
    }
}
