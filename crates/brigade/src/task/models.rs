//! Task data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "LOW"),
            TaskPriority::Medium => write!(f, "MEDIUM"),
            TaskPriority::High => write!(f, "HIGH"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Operational zone a task belongs to. Closed set, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskArea {
    Kitchen,
    Bar,
    Dining,
    Register,
    Storage,
}

impl std::fmt::Display for TaskArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskArea::Kitchen => write!(f, "KITCHEN"),
            TaskArea::Bar => write!(f, "BAR"),
            TaskArea::Dining => write!(f, "DINING"),
            TaskArea::Register => write!(f, "REGISTER"),
            TaskArea::Storage => write!(f, "STORAGE"),
        }
    }
}

impl std::str::FromStr for TaskArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KITCHEN" => Ok(TaskArea::Kitchen),
            "BAR" => Ok(TaskArea::Bar),
            "DINING" => Ok(TaskArea::Dining),
            "REGISTER" => Ok(TaskArea::Register),
            "STORAGE" => Ok(TaskArea::Storage),
            _ => Err(format!("unknown area: {}", s)),
        }
    }
}

impl TryFrom<String> for TaskArea {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Done => write!(f, "DONE"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            _ => Err(format!("unknown status: {}", s)),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Task entity from the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    #[sqlx(try_from = "String")]
    pub area: TaskArea,
    pub estimated_minutes: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    /// Current assignee. Once set, the only principal allowed to change
    /// the task's status.
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One assignment event. Append-only history; `Task.assigned_to` stays
/// authoritative for ownership.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub created_at: String,
}

/// Request to create a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub area: TaskArea,
    pub estimated_minutes: Option<i64>,
}

/// Request to assign a task to a worker.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignTaskRequest {
    pub user_id: String,
}

/// Request to change a task's priority.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskPriorityRequest {
    pub priority: TaskPriority,
}

/// Request to change a task's status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

/// Query parameters for filtering tasks by area.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaFilterQuery {
    pub area: TaskArea,
}
