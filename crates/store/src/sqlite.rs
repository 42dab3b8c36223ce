//! SQLite task store.
//!
//! A single `tasks` table; ids come from `AUTOINCREMENT` so they are never
//! reused after a delete. Timestamps are stored as RFC 3339 text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use taskpilot_core::error::StoreError;
use taskpilot_core::task::{
    DeleteTarget, NewTask, Task, TaskFilter, TaskPriority, TaskStatus, TaskStore, TaskUpdate,
};
use tracing::{debug, info};

/// A SQLite-backed task store.
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (and create if missing) the database at `url`, then run migrations.
    ///
    /// `sqlite::memory:` gives an in-process ephemeral database held by a
    /// single pooled connection.
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Normal);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = SqlitePoolOptions::new();
        let pool_options = if in_memory {
            // Every connection to :memory: is a separate database.
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite task store initialized at {url}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create the schema. Safe to run on every start.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                title        TEXT NOT NULL,
                description  TEXT,
                status       TEXT NOT NULL DEFAULT 'todo',
                priority     TEXT NOT NULL DEFAULT 'medium',
                due_date     TEXT,
                created_at   TEXT NOT NULL,
                updated_at   TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("tasks table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("status index: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("priority index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `Task` from a SQLite row.
    fn row_to_task(row: &SqliteRow) -> Result<Task, StoreError> {
        let column = |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));

        let id: i64 = row.try_get("id").map_err(|e| column("id", e))?;
        let title: String = row.try_get("title").map_err(|e| column("title", e))?;
        let description: Option<String> =
            row.try_get("description").map_err(|e| column("description", e))?;
        let status: String = row.try_get("status").map_err(|e| column("status", e))?;
        let priority: String = row.try_get("priority").map_err(|e| column("priority", e))?;
        let due_date: Option<String> = row.try_get("due_date").map_err(|e| column("due_date", e))?;
        let created_at: String = row.try_get("created_at").map_err(|e| column("created_at", e))?;
        let updated_at: Option<String> =
            row.try_get("updated_at").map_err(|e| column("updated_at", e))?;

        let status = TaskStatus::from_str(&status)
            .map_err(|v| StoreError::QueryFailed(format!("unknown status '{v}' in task {id}")))?;
        let priority = TaskPriority::from_str(&priority)
            .map_err(|v| StoreError::QueryFailed(format!("unknown priority '{v}' in task {id}")))?;

        Ok(Task {
            id,
            title,
            description,
            status,
            priority,
            due_date: due_date.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }

    async fn fetch(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("SELECT task {id}: {e}")))?;
        row.as_ref().map(Self::row_to_task).transpose()
    }

    async fn delete_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the lowest-id task whose title contains `text`.
    ///
    /// Matching uses Unicode lowercasing like the in-memory store; SQLite's
    /// `LIKE` only folds ASCII.
    async fn delete_first_titled(&self, text: &str) -> Result<bool, StoreError> {
        let needle = text.to_lowercase();
        loop {
            let rows = sqlx::query("SELECT id, title FROM tasks ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::QueryFailed(format!("Scan titles: {e}")))?;

            let mut candidate = None;
            for row in &rows {
                let title: String = row
                    .try_get("title")
                    .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?;
                if title.to_lowercase().contains(&needle) {
                    let id: i64 = row
                        .try_get("id")
                        .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
                    candidate = Some(id);
                    break;
                }
            }

            let Some(id) = candidate else {
                return Ok(false);
            };
            if self.delete_id(id).await? {
                return Ok(true);
            }
            // Someone else deleted it first; look again.
        }
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("bad timestamp '{s}': {e}")))
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        let id = result.last_insert_rowid();
        debug!(task_id = id, "Created task");

        Ok(Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at,
            updated_at: None,
        })
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM tasks
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR priority = ?2)
            ORDER BY id ASC
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.priority.map(|p| p.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("List tasks: {e}")))?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, StoreError> {
        self.fetch(id).await
    }

    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>, StoreError> {
        // Must stay a single statement: concurrent partial updates of one row merge.
        let row = sqlx::query(
            r#"
            UPDATE tasks
            SET title       = COALESCE(?1, title),
                description = COALESCE(?2, description),
                status      = COALESCE(?3, status),
                priority    = COALESCE(?4, priority),
                due_date    = COALESCE(?5, due_date),
                updated_at  = ?6
            WHERE id = ?7
            RETURNING *
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.priority.map(|p| p.as_str()))
        .bind(update.due_date.map(|d| d.to_rfc3339()))
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("UPDATE failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        debug!(task_id = id, "Updated task");
        Self::row_to_task(&row).map(Some)
    }

    async fn delete(&self, target: DeleteTarget) -> Result<bool, StoreError> {
        let deleted = match &target {
            DeleteTarget::Id(id) => self.delete_id(*id).await?,
            DeleteTarget::TitleContains(text) => self.delete_first_titled(text).await?,
        };
        debug!(?target, deleted, "Delete task");
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM tasks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT failed: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::QueryFailed(format!("n column: {e}")))?;
        Ok(n as usize)
    }
}
