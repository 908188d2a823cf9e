//! Request handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Role, authorize};
use crate::task::{
    AreaFilterQuery, AssignTaskRequest, Assignment, CreateTaskRequest, Task,
    UpdateTaskPriorityRequest, UpdateTaskStatusRequest,
};
use crate::user::{CreateUserRequest, UpdateUserRequest, UserInfo};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Login endpoint. Every denial is the same 401, whichever half of the
/// credential was wrong.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let principal = state.auth.verify(&request.email, &request.password).await?;
    let access_token = state.tokens.issue(&principal)?;

    info!(user_id = %principal.id, "user logged in");

    Ok((StatusCode::CREATED, Json(LoginResponse { access_token })))
}

// ============================================================================
// Tasks
// ============================================================================

/// Create a task (supervisor/admin).
#[instrument(skip(state, request), fields(title = %request.title))]
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List all tasks (supervisor/admin).
#[instrument(skip(state))]
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_all().await?;
    Ok(Json(tasks))
}

/// List tasks in one area (supervisor/admin). Zero matches is an empty
/// list, not an error.
#[instrument(skip(state))]
pub async fn list_tasks_by_area(
    State(state): State<AppState>,
    Query(query): Query<AreaFilterQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_by_area(query.area).await?;
    Ok(Json(tasks))
}

/// Tasks assigned to the caller, highest priority first (worker).
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn my_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_mine(user.id()).await?;
    Ok(Json(tasks))
}

/// Overwrite a task's priority (supervisor/admin).
#[instrument(skip(state))]
pub async fn update_task_priority(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskPriorityRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.update_priority(&task_id, request.priority).await?;
    Ok(Json(task))
}

/// Assign a task to a worker (supervisor/admin).
#[instrument(skip(state))]
pub async fn assign_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<AssignTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.assign(&task_id, &request.user_id).await?;
    Ok(Json(task))
}

/// Change a task's status (worker). Ownership-checked against the caller.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn update_task_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .update_status(&task_id, user.id(), request.status)
        .await?;
    Ok(Json(task))
}

/// Assignment history for a task (supervisor/admin).
#[instrument(skip(state))]
pub async fn task_assignments(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<Assignment>>> {
    let assignments = state.tasks.assignments(&task_id).await?;
    Ok(Json(assignments))
}

// ============================================================================
// Users
// ============================================================================

/// Create a user (admin).
#[instrument(skip(state, user, request), fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    authorize(Some(&user.0), ADMIN_ONLY)?;

    let created = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Bootstrap endpoint: creates a user without authentication, for
/// first-run setup. The `bootstrap-admin` CLI subcommand is the
/// operator-side equivalent.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn bootstrap_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let created = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List users. Workers see only their own record.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<UserInfo>>> {
    if user.role() == Role::Colaborador {
        let own = state.users.get_user(user.id()).await?;
        return Ok(Json(vec![own.into()]));
    }

    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// Get a user. Workers may only fetch their own record.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserInfo>> {
    if user.role() == Role::Colaborador && user.id() != id {
        return Err(ApiError::forbidden("you may only access your own record"));
    }

    let found = state.users.get_user(&id).await?;
    Ok(Json(found.into()))
}

/// Update a user. Workers may only update their own record, and only an
/// admin may change a role.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    if user.role() == Role::Colaborador && user.id() != id {
        return Err(ApiError::forbidden("you may only access your own record"));
    }
    if request.role.is_some() && user.role() != Role::Admin {
        return Err(ApiError::forbidden("only an admin may change roles"));
    }

    let updated = state.users.update_user(&id, request).await?;
    Ok(Json(updated.into()))
}

/// Delete a user (admin).
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    authorize(Some(&user.0), ADMIN_ONLY)?;

    state.users.delete_user(&id).await?;
    info!(deleted_id = %id, "admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Roles
// ============================================================================

/// The closed role set. Roles are an enumeration, not records; the admin
/// gate is attached where the route is registered.
pub async fn list_roles() -> Json<Vec<Role>> {
    Json(Role::ALL.to_vec())
}
