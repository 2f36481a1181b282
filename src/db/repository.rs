//! Database repository for member records.
//!
//! Reads and deletes go straight to the pool. The `*_in` forms take a connection
//! so callers can run a read-modify-write inside one transaction from [`Repository::begin`].

use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::MemberRecord;

/// Database repository for member records.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction for an atomic read-modify-write.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`) so concurrent writers
    /// wait on the busy timeout instead of failing when their read snapshot goes stale.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Get a member by name.
    pub async fn get_member(&self, name: &str) -> Result<Option<MemberRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::get_member_in(&mut conn, name).await
    }

    /// Delete a member. Returns `true` if a row was removed.
    pub async fn delete_member(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM members WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All members, highest points first. Ties keep insertion order.
    pub async fn leaderboard(&self) -> Result<Vec<MemberRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT name, points, completed_tasks, last_updated FROM members ORDER BY points DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by name on an existing connection.
    pub async fn get_member_in(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<MemberRecord>, AppError> {
        let row = sqlx::query(
            "SELECT name, points, completed_tasks, last_updated FROM members WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Insert a member, or overwrite points, tasks and timestamp of the existing one.
    pub async fn upsert_member_in(
        conn: &mut SqliteConnection,
        record: &MemberRecord,
    ) -> Result<(), AppError> {
        let tasks_json = serde_json::to_string(&record.completed_tasks)
            .map_err(|e| AppError::Internal(format!("Failed to encode task list: {}", e)))?;
        let last_updated = record
            .last_updated
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("Member {} has no timestamp", record.name)))?;

        sqlx::query(
            r#"INSERT INTO members (name, points, completed_tasks, last_updated)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(name) DO UPDATE SET
                   points = excluded.points,
                   completed_tasks = excluded.completed_tasks,
                   last_updated = excluded.last_updated"#,
        )
        .bind(&record.name)
        .bind(record.points)
        .bind(&tasks_json)
        .bind(last_updated)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// Helper functions for row conversion

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> MemberRecord {
    let tasks_str: String = row.get("completed_tasks");
    MemberRecord {
        name: row.get("name"),
        points: row.get("points"),
        completed_tasks: parse_json_array(&tasks_str),
        last_updated: Some(row.get("last_updated")),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn test_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    async fn upsert(repo: &Repository, record: &MemberRecord) -> Result<(), AppError> {
        let mut tx = repo.begin().await?;
        Repository::upsert_member_in(&mut tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    fn record(name: &str, points: i64, tasks: &[&str]) -> MemberRecord {
        MemberRecord {
            name: name.to_string(),
            points,
            completed_tasks: tasks.iter().map(|t| t.to_string()).collect(),
            last_updated: Some("2026-01-01T00:00:00+00:00".to_string()),
        }
    }

    #[test]
    fn test_parse_json_array_malformed_is_empty() {
        assert!(parse_json_array("not json").is_empty());
        assert_eq!(parse_json_array(r#"["a","b"]"#), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_get_missing_member() {
        let (repo, _dir) = test_repo().await;
        assert!(repo.get_member("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (repo, _dir) = test_repo().await;

        upsert(&repo, &record("alice", 5, &["dishes"])).await.unwrap();
        upsert(&repo, &record("alice", 9, &["dishes", "trash"]))
            .await
            .unwrap();

        let stored = repo.get_member("alice").await.unwrap().unwrap();
        assert_eq!(stored.points, 9);
        assert_eq!(stored.completed_tasks, vec!["dishes", "trash"]);
        assert_eq!(repo.leaderboard().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let (repo, _dir) = test_repo().await;
        upsert(&repo, &record("Alice", 1, &[])).await.unwrap();
        assert!(repo.get_member("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_without_timestamp_fails() {
        let (repo, _dir) = test_repo().await;
        let result = upsert(&repo, &MemberRecord::empty("ghost")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (repo, _dir) = test_repo().await;
        upsert(&repo, &record("bob", 1, &[])).await.unwrap();

        assert!(repo.delete_member("bob").await.unwrap());
        assert!(!repo.delete_member("bob").await.unwrap());
        assert!(repo.get_member("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_leaderboard_order_and_ties() {
        let (repo, _dir) = test_repo().await;
        upsert(&repo, &record("low", -3, &[])).await.unwrap();
        upsert(&repo, &record("tie_first", 10, &[])).await.unwrap();
        upsert(&repo, &record("top", 42, &[])).await.unwrap();
        upsert(&repo, &record("tie_second", 10, &[])).await.unwrap();

        let names: Vec<String> = repo
            .leaderboard()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["top", "tie_first", "tie_second", "low"]);
    }

    #[tokio::test]
    async fn test_transaction_rollback_discards_upsert() {
        let (repo, _dir) = test_repo().await;

        let mut tx = repo.begin().await.unwrap();
        Repository::upsert_member_in(&mut tx, &record("temp", 1, &[]))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(repo.get_member("temp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_writer_waits_for_first() {
        let (repo, _dir) = test_repo().await;

        let mut first = repo.begin().await.unwrap();
        Repository::upsert_member_in(&mut first, &record("first", 1, &[]))
            .await
            .unwrap();

        let other = repo.clone();
        let second = tokio::spawn(async move { upsert(&other, &record("second", 2, &[])).await });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!second.is_finished());

        first.commit().await.unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(repo.leaderboard().await.unwrap().len(), 2);
    }
}
