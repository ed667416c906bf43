use std::sync::Once;

use chrono::{DateTime, Utc};
use rocket::serde::json::Json;
use rocket::*;
use sqlx::any::AnyPoolOptions;
use sqlx::Row;

use crate::config::Config;

mod request_error;
pub mod requests;
mod score;

pub use request_error::*;
pub use score::{GameScore, ScoreRecord, ScoreSubmission};

pub type DatabasePool = sqlx::AnyPool;

static INSTALL_DRIVERS: Once = Once::new();

/// Builds the connection pool described by `config` and makes sure the
/// `highscores` table exists.
pub async fn connect(config: &Config) -> Result<DatabasePool, sqlx::Error> {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.database_url)
        .await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

async fn ensure_schema(database: &DatabasePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS highscores ( \
            user_name TEXT NOT NULL, \
            score BIGINT NOT NULL, \
            timestamp TEXT NOT NULL \
        )",
    )
    .execute(database)
    .await?;

    Ok(())
}

/// Durably appends one record. There is no uniqueness constraint: repeated
/// submissions insert one row each.
pub async fn insert_score(
    record: &ScoreRecord,
    database: &DatabasePool,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO highscores (user_name, score, timestamp) VALUES (?, ?, ?)")
        .bind(&record.user_name)
        .bind(record.score)
        .bind(record.timestamp_column())
        .execute(database)
        .await?;

    Ok(())
}

/// Fetches up to `limit` records ordered by score descending, ties in
/// storage order. `since` restricts the result to records stamped at or
/// after that instant. An undersized table yields a short (possibly empty)
/// vector, never an error.
pub async fn query_top_scores(
    since: Option<DateTime<Utc>>,
    limit: i64,
    database: &DatabasePool,
) -> Result<Vec<ScoreRecord>, sqlx::Error> {
    let rows = match since {
        Some(since) => {
            sqlx::query(
                "SELECT user_name, score, timestamp FROM highscores \
                 WHERE timestamp >= ? ORDER BY score DESC LIMIT ?",
            )
            .bind(score::encode_timestamp(&since))
            .bind(limit)
            .fetch_all(database)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT user_name, score, timestamp FROM highscores \
                 ORDER BY score DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(database)
            .await?
        }
    };

    rows.into_iter()
        .map(|row| {
            let raw_timestamp = row.try_get::<String, _>("timestamp")?;
            Ok(ScoreRecord {
                user_name: row.try_get("user_name")?,
                score: row.try_get("score")?,
                timestamp: score::decode_timestamp(&raw_timestamp).map_err(|error| {
                    sqlx::Error::ColumnDecode {
                        index: String::from("timestamp"),
                        source: Box::new(error),
                    }
                })?,
            })
        })
        .collect()
}

/// Cheap round-trip against the store, used by the readiness route.
pub async fn ping(database: &DatabasePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(database).await?;
    Ok(())
}
