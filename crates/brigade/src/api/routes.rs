//! Router construction.
//!
//! Each protected route group carries its required-role set as data; the
//! gates all call the same `authorize` decision function.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Role, auth_middleware, require_roles};

use super::handlers;
use super::state::AppState;

/// Roles allowed to manage tasks and see the full board.
const MANAGERS: &[Role] = &[Role::Supervisor, Role::Admin];
/// Roles allowed to work assigned tasks.
const WORKERS: &[Role] = &[Role::Colaborador];
/// Roles allowed to read the role enumeration.
const ADMINS: &[Role] = &[Role::Admin];

/// Create the application router.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    let manager_routes = Router::new()
        .route(
            "/tasks",
            post(handlers::create_task).get(handlers::list_tasks),
        )
        .route("/tasks/by-area", get(handlers::list_tasks_by_area))
        .route("/tasks/{id}/priority", patch(handlers::update_task_priority))
        .route("/tasks/{id}/assign", patch(handlers::assign_task))
        .route("/tasks/{id}/assignments", get(handlers::task_assignments))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_roles(MANAGERS, req, next)
        }));

    let worker_routes = Router::new()
        .route("/tasks/my-tasks", get(handlers::my_tasks))
        .route("/tasks/{id}/status", patch(handlers::update_task_status))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_roles(WORKERS, req, next)
        }));

    let admin_routes = Router::new()
        .route("/roles", get(handlers::list_roles))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_roles(ADMINS, req, next)
        }));

    // Role checks for mixed-access user routes live in the handlers, which
    // call the same authorize() with the same kind of constant role sets.
    let user_routes = Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        );

    let protected_routes = Router::new()
        .merge(manager_routes)
        .merge(worker_routes)
        .merge(admin_routes)
        .merge(user_routes)
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/users/bootstrap", post(handlers::bootstrap_user))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
