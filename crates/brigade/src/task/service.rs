//! Task lifecycle service.
//!
//! Role checks happen before these operations are invoked; the one rule
//! enforced here is ownership: only the currently assigned worker may change
//! a task's status.

use thiserror::Error;
use tracing::{info, instrument};

use super::models::{
    Assignment, CreateTaskRequest, Task, TaskArea, TaskPriority, TaskStatus,
};
use super::repository::TaskRepository;

/// Task operation failures.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("task is not assigned to the requesting user")]
    OwnershipViolation,

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TaskError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Service for the task lifecycle.
#[derive(Debug, Clone)]
pub struct TaskService {
    repo: TaskRepository,
}

impl TaskService {
    pub fn new(repo: TaskRepository) -> Self {
        Self { repo }
    }

    /// Create a task. New tasks start PENDING, unassigned, and default to
    /// MEDIUM priority.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, TaskError> {
        if request.title.trim().is_empty() {
            return Err(TaskError::validation("title", "must not be empty"));
        }
        if let Some(minutes) = request.estimated_minutes {
            if minutes < 1 {
                return Err(TaskError::validation(
                    "estimated_minutes",
                    "must be a positive integer",
                ));
            }
        }

        let task = self.repo.create(request).await?;
        info!(task_id = %task.id, area = %task.area, "created task");

        Ok(task)
    }

    /// List every task.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.repo.list().await?)
    }

    /// List tasks in one area. An area with no tasks yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_by_area(&self, area: TaskArea) -> Result<Vec<Task>, TaskError> {
        Ok(self.repo.list_by_area(area).await?)
    }

    /// Overwrite a task's priority. No ownership check; callers gate this
    /// to privileged roles.
    #[instrument(skip(self))]
    pub async fn update_priority(
        &self,
        task_id: &str,
        priority: TaskPriority,
    ) -> Result<Task, TaskError> {
        self.get(task_id).await?;

        let task = self.repo.set_priority(task_id, priority).await?;
        info!(task_id = %task.id, priority = %task.priority, "updated task priority");

        Ok(task)
    }

    /// Assign a task to a worker and record the assignment event.
    ///
    /// The worker id is written as given; whether it names an existing user
    /// is the caller's concern.
    #[instrument(skip(self))]
    pub async fn assign(&self, task_id: &str, user_id: &str) -> Result<Task, TaskError> {
        self.get(task_id).await?;

        let task = self.repo.set_assignee(task_id, user_id).await?;
        info!(task_id = %task.id, user_id = %user_id, "assigned task");

        Ok(task)
    }

    /// Tasks assigned to `user_id`, highest priority first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        Ok(self.repo.list_assigned(user_id).await?)
    }

    /// Change a task's status on behalf of `requester_id`.
    ///
    /// Only the currently assigned worker may do this; an unassigned task
    /// cannot have its status changed by anyone. Any member of the status
    /// set is accepted as the new value.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        task_id: &str,
        requester_id: &str,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        let task = self.get(task_id).await?;

        if task.assigned_to.as_deref() != Some(requester_id) {
            return Err(TaskError::OwnershipViolation);
        }

        let task = self.repo.set_status(task_id, status).await?;
        info!(task_id = %task.id, status = %task.status, "updated task status");

        Ok(task)
    }

    /// Assignment history for a task, oldest first.
    #[instrument(skip(self))]
    pub async fn assignments(&self, task_id: &str) -> Result<Vec<Assignment>, TaskError> {
        self.get(task_id).await?;
        Ok(self.repo.list_assignments(task_id).await?)
    }

    async fn get(&self, task_id: &str) -> Result<Task, TaskError> {
        self.repo
            .get(task_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn test_service() -> TaskService {
        let db = Database::in_memory().await.unwrap();
        TaskService::new(TaskRepository::new(db.pool().clone()))
    }

    fn request(title: &str, area: TaskArea) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            priority: None,
            area,
            estimated_minutes: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_medium_pending_unassigned() {
        let service = test_service().await;

        let task = service
            .create(request("Clean kitchen", TaskArea::Kitchen))
            .await
            .unwrap();

        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.assigned_to.is_none());
    }

    #[tokio::test]
    async fn create_rejects_empty_title_and_bad_estimate() {
        let service = test_service().await;

        let err = service
            .create(request("   ", TaskArea::Kitchen))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "title", .. }));

        let err = service
            .create(CreateTaskRequest {
                estimated_minutes: Some(0),
                ..request("Wipe counters", TaskArea::Kitchen)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation {
                field: "estimated_minutes",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn update_priority_requires_existing_task() {
        let service = test_service().await;

        let err = service
            .update_priority("missing-task", TaskPriority::High)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_the_assigned_worker_may_change_status() {
        let service = test_service().await;

        let task = service
            .create(request("Prep bar", TaskArea::Bar))
            .await
            .unwrap();
        service.assign(&task.id, "worker-1").await.unwrap();

        // A different requester on the same task always fails
        let err = service
            .update_status(&task.id, "worker-2", TaskStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::OwnershipViolation));

        let updated = service
            .update_status(&task.id, "worker-1", TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn unassigned_task_status_cannot_be_changed_by_anyone() {
        let service = test_service().await;

        let task = service
            .create(request("Sweep floor", TaskArea::Dining))
            .await
            .unwrap();

        let err = service
            .update_status(&task.id, "worker-1", TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::OwnershipViolation));
    }

    #[tokio::test]
    async fn status_accepts_any_enumeration_value() {
        let service = test_service().await;

        let task = service
            .create(request("Inventory", TaskArea::Storage))
            .await
            .unwrap();
        service.assign(&task.id, "worker-1").await.unwrap();

        // PENDING -> DONE directly, and back again: no ordering guard
        let task = service
            .update_status(&task.id, "worker-1", TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Done);

        let task = service
            .update_status(&task.id, "worker-1", TaskStatus::Pending)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn assign_does_not_require_the_worker_to_exist() {
        let service = test_service().await;

        let task = service
            .create(request("Refill register", TaskArea::Register))
            .await
            .unwrap();

        // No user table lookup; the id is written as given
        let task = service.assign(&task.id, "ghost-worker").await.unwrap();
        assert_eq!(task.assigned_to.as_deref(), Some("ghost-worker"));
    }

    #[tokio::test]
    async fn concurrent_priority_updates_resolve_last_write_wins() {
        let db = Database::in_memory().await.unwrap();
        let service = TaskService::new(TaskRepository::new(db.pool().clone()));

        let task = service
            .create(request("Racy task", TaskArea::Kitchen))
            .await
            .unwrap();

        // Both callers pass the existence check before either writes; both
        // succeed and the final value is whichever wrote last.
        let a = service.update_priority(&task.id, TaskPriority::High);
        let b = service.update_priority(&task.id, TaskPriority::Low);
        let (a, b) = tokio::join!(a, b);
        a.unwrap();
        b.unwrap();

        let final_task = service.list_all().await.unwrap().remove(0);
        assert!(
            final_task.priority == TaskPriority::High || final_task.priority == TaskPriority::Low
        );
    }
}
