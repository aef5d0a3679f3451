use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::MatchResult;
use crate::error::{MatchError, Result};
use crate::tally::{points_for, TallyEntry, TallyStats, TallyStore};

/// SQLite-backed leaderboard
///
/// ```sql
/// CREATE TABLE tally (
///     name TEXT PRIMARY KEY,
///     points INTEGER NOT NULL DEFAULT 0,
///     updated_at TEXT NOT NULL
/// );
/// ```
///
/// Awards run in a single transaction behind a mutex, so concurrent
/// sessions never lose each other's points.
pub struct SqliteTally {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTally {
    /// Open (or create) the tally database
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tally (
                name TEXT PRIMARY KEY,
                points INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tally_points ON tally(points DESC)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MatchError::Other("tally connection lock poisoned".to_string()))
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn to_points(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

#[async_trait]
impl TallyStore for SqliteTally {
    async fn award(&self, results: &[MatchResult]) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        for (name, points) in points_for(results) {
            tx.execute(
                "INSERT INTO tally (name, points, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                     points = points + excluded.points,
                     updated_at = excluded.updated_at",
                params![name, points as i64, now],
            )?;
        }

        tx.commit()?;
        tracing::debug!("Awarded tally points to {} candidates", results.len());

        Ok(())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<TallyEntry>> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT name, points, updated_at FROM tally
             ORDER BY points DESC, name ASC
             LIMIT ?",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            let updated_at: String = row.get(2)?;
            Ok(TallyEntry {
                name: row.get(0)?,
                points: to_points(row.get(1)?),
                updated_at: parse_timestamp(&updated_at),
            })
        })?;

        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    async fn points(&self, name: &str) -> Result<u64> {
        let conn = self.lock()?;

        let points: Option<i64> = conn
            .query_row(
                "SELECT points FROM tally WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(points.map(to_points).unwrap_or(0))
    }

    async fn reset(&self) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM tally", [])?;
        Ok(deleted as u64)
    }

    async fn stats(&self) -> Result<TallyStats> {
        let conn = self.lock()?;

        let (total_names, total_points, last_updated) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(points), 0), MAX(updated_at) FROM tally",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )?;

        Ok(TallyStats {
            total_names: to_points(total_names),
            total_points: to_points(total_points),
            last_updated: last_updated.as_deref().map(parse_timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CandidateRecord, StanceVector};

    fn results(names: &[&str]) -> Vec<MatchResult> {
        names
            .iter()
            .map(|n| MatchResult::new(CandidateRecord::new(*n, "", "", StanceVector::new()), 50))
            .collect()
    }

    #[tokio::test]
    async fn test_tally_create() {
        let tally = SqliteTally::new(":memory:").await.unwrap();
        let stats = tally.stats().await.unwrap();
        assert_eq!(stats.total_names, 0);
        assert_eq!(stats.total_points, 0);
        assert!(stats.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_award_accumulates() {
        let tally = SqliteTally::new(":memory:").await.unwrap();

        tally.award(&results(&["A", "B", "C"])).await.unwrap();
        tally.award(&results(&["B", "A"])).await.unwrap();

        assert_eq!(tally.points("A").await.unwrap(), 4);
        assert_eq!(tally.points("B").await.unwrap(), 4);
        assert_eq!(tally.points("C").await.unwrap(), 1);
        assert_eq!(tally.points("Nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_leaderboard_order_and_limit() {
        let tally = SqliteTally::new(":memory:").await.unwrap();

        tally.award(&results(&["Ito", "Sato", "Abe"])).await.unwrap();
        tally.award(&results(&["Sato"])).await.unwrap();

        let board = tally.leaderboard(10).await.unwrap();
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ito", "Sato", "Abe"]);
        assert_eq!(board[1].points, 3);

        // Abe, Ito and Sato all reach 3; ties break by name
        tally.award(&results(&["Abe", "Zed"])).await.unwrap();
        let top = tally.leaderboard(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Abe");
        assert_eq!(top[1].name, "Ito");
    }

    #[tokio::test]
    async fn test_stats_and_reset() {
        let tally = SqliteTally::new(":memory:").await.unwrap();
        tally.award(&results(&["A", "B"])).await.unwrap();

        let stats = tally.stats().await.unwrap();
        assert_eq!(stats.total_names, 2);
        assert_eq!(stats.total_points, 3);
        assert!(stats.last_updated.is_some());

        assert_eq!(tally.reset().await.unwrap(), 2);
        assert_eq!(tally.stats().await.unwrap().total_names, 0);
    }

    #[tokio::test]
    async fn test_empty_award_is_noop() {
        let tally = SqliteTally::new(":memory:").await.unwrap();
        tally.award(&[]).await.unwrap();
        assert_eq!(tally.stats().await.unwrap().total_names, 0);
    }
}
