//! Task lifecycle.

mod models;
mod repository;
mod service;

pub use models::{
    AreaFilterQuery, AssignTaskRequest, Assignment, CreateTaskRequest, Task, TaskArea,
    TaskPriority, TaskStatus, UpdateTaskPriorityRequest, UpdateTaskStatusRequest,
};
pub use repository::TaskRepository;
pub use service::{TaskError, TaskService};
