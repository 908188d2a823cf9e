//! Task repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{Assignment, CreateTaskRequest, Task, TaskArea, TaskPriority, TaskStatus};

const TASK_COLUMNS: &str = r#"
    id, title, description, priority, area, estimated_minutes, status,
    assigned_to, created_at, updated_at
"#;

/// Repository for task and assignment database operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new task. Status starts PENDING with no assignee.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task> {
        let id = Uuid::new_v4().to_string();
        let priority = request.priority.unwrap_or_default();

        debug!("creating task: {} ({})", request.title, id);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, description, priority, area, estimated_minutes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(priority.to_string())
        .bind(request.area.to_string())
        .bind(request.estimated_minutes)
        .execute(&self.pool)
        .await
        .context("inserting task")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after creation"))
    }

    /// Get a task by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Task>> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("fetching task")?;

        Ok(task)
    }

    /// List all tasks.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing tasks")?;

        Ok(tasks)
    }

    /// List tasks in one area. Empty result is not an error.
    #[instrument(skip(self))]
    pub async fn list_by_area(&self, area: TaskArea) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE area = ? ORDER BY created_at, rowid"
        ))
        .bind(area.to_string())
        .fetch_all(&self.pool)
        .await
        .context("listing tasks by area")?;

        Ok(tasks)
    }

    /// List tasks assigned to one worker, highest priority first.
    ///
    /// The ordering (HIGH, MEDIUM, LOW; ties by creation order) is part of
    /// the service contract, so it is spelled out here rather than left to
    /// the storage engine's collation.
    #[instrument(skip(self))]
    pub async fn list_assigned(&self, user_id: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE assigned_to = ?
            ORDER BY
                CASE priority WHEN 'HIGH' THEN 0 WHEN 'MEDIUM' THEN 1 ELSE 2 END,
                created_at, rowid
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("listing assigned tasks")?;

        Ok(tasks)
    }

    /// Overwrite a task's priority.
    #[instrument(skip(self))]
    pub async fn set_priority(&self, id: &str, priority: TaskPriority) -> Result<Task> {
        sqlx::query("UPDATE tasks SET priority = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(priority.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating task priority")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update: {}", id))
    }

    /// Set a task's assignee and append an assignment history row.
    #[instrument(skip(self))]
    pub async fn set_assignee(&self, id: &str, user_id: &str) -> Result<Task> {
        sqlx::query("UPDATE tasks SET assigned_to = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating task assignee")?;

        let task = self
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update: {}", id))?;

        sqlx::query(
            r#"
            INSERT INTO assignments (id, task_id, user_id, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id)
        .bind(user_id)
        .bind(task.status.to_string())
        .execute(&self.pool)
        .await
        .context("recording assignment")?;

        Ok(task)
    }

    /// Overwrite a task's status.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        sqlx::query("UPDATE tasks SET status = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating task status")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update: {}", id))
    }

    /// Assignment history for a task, oldest first.
    #[instrument(skip(self))]
    pub async fn list_assignments(&self, task_id: &str) -> Result<Vec<Assignment>> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, task_id, user_id, status, created_at
            FROM assignments
            WHERE task_id = ?
            ORDER BY created_at, rowid
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .context("listing assignments")?;

        Ok(assignments)
    }
}
