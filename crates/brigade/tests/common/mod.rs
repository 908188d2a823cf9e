//! Test utilities and common setup.

use axum::Router;
use brigade::api::{self, AppState};
use brigade::auth::{AuthService, Principal, Role, TokenService};
use brigade::db::Database;
use brigade::task::{TaskRepository, TaskService};
use brigade::user::{CreateUserRequest, UserRepository, UserService};

/// Signing secret used by every integration test.
pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

pub const ADMIN_PASSWORD: &str = "adminpassword123";
pub const SUPERVISOR_PASSWORD: &str = "supervisorpass123";
pub const WORKER_PASSWORD: &str = "workerpassword123";

/// A seeded user plus a ready-to-use bearer token.
pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Fully wired application over an in-memory database.
pub struct TestApp {
    pub router: Router,
    pub admin: SeededUser,
    pub supervisor: SeededUser,
    pub worker: SeededUser,
    pub worker2: SeededUser,
}

/// Create a test application with seeded users for every role.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let tokens = TokenService::new(TEST_SECRET, 3600);

    let user_service = UserService::new(UserRepository::new(db.pool().clone()));
    let task_service = TaskService::new(TaskRepository::new(db.pool().clone()));
    let auth_service = AuthService::new(UserRepository::new(db.pool().clone()));

    let admin = seed_user(
        &user_service,
        &tokens,
        "admin@example.com",
        "Admin",
        ADMIN_PASSWORD,
        Role::Admin,
    )
    .await;
    let supervisor = seed_user(
        &user_service,
        &tokens,
        "supervisor@example.com",
        "Shift Supervisor",
        SUPERVISOR_PASSWORD,
        Role::Supervisor,
    )
    .await;
    let worker = seed_user(
        &user_service,
        &tokens,
        "worker@example.com",
        "Worker One",
        WORKER_PASSWORD,
        Role::Colaborador,
    )
    .await;
    let worker2 = seed_user(
        &user_service,
        &tokens,
        "worker2@example.com",
        "Worker Two",
        WORKER_PASSWORD,
        Role::Colaborador,
    )
    .await;

    let state = AppState::new(user_service, task_service, auth_service, tokens.clone());
    let router = api::create_router(state, 1024 * 1024);

    TestApp {
        router,
        admin,
        supervisor,
        worker,
        worker2,
    }
}

async fn seed_user(
    users: &UserService,
    tokens: &TokenService,
    email: &str,
    name: &str,
    password: &str,
    role: Role,
) -> SeededUser {
    let user = users
        .create_user(CreateUserRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            role: Some(role),
        })
        .await
        .expect("seeding test user");

    let token = tokens
        .issue(&Principal {
            id: user.id.clone(),
            role,
        })
        .expect("issuing test token");

    SeededUser {
        id: user.id,
        email: user.email,
        token,
    }
}
