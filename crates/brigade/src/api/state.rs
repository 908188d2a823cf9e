//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AuthService, TokenService};
use crate::task::TaskService;
use crate::user::UserService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User management service.
    pub users: Arc<UserService>,
    /// Task lifecycle service.
    pub tasks: Arc<TaskService>,
    /// Credential verification.
    pub auth: Arc<AuthService>,
    /// Token issuance/validation.
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(
        users: UserService,
        tasks: TaskService,
        auth: AuthService,
        tokens: TokenService,
    ) -> Self {
        Self {
            users: Arc::new(users),
            tasks: Arc::new(tasks),
            auth: Arc::new(auth),
            tokens,
        }
    }
}
