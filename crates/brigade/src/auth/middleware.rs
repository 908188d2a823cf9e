//! Authentication middleware and per-route role gates.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use log::warn;

use super::authorize::{AuthzError, authorize};
use super::claims::{Principal, Role};
use super::error::AuthError;
use super::token::TokenService;

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authenticated principal extracted from the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl CurrentUser {
    /// Get the user ID.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// Get the user's role.
    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

impl From<AuthzError> for AuthError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => AuthError::MissingAuthHeader,
            AuthzError::InsufficientRole => AuthError::InsufficientRole,
        }
    }
}

/// Authentication middleware.
///
/// Validates the bearer token and injects `CurrentUser` into request
/// extensions for downstream extractors and role gates.
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = bearer_token_from_header(header)?;

    let principal = tokens.validate(token).inspect_err(|e| {
        warn!("token validation failed: {e}");
    })?;

    req.extensions_mut().insert(CurrentUser(principal));

    Ok(next.run(req).await)
}

/// Per-route role gate.
///
/// The required set is attached as data where the route is registered:
///
/// ```ignore
/// .route_layer(middleware::from_fn(|req: Request, next: Next| {
///     require_roles(&[Role::Supervisor, Role::Admin], req, next)
/// }))
/// ```
pub async fn require_roles(
    required: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = req.extensions().get::<CurrentUser>().map(|u| &u.0);
    authorize(principal, required)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
    }

    #[test]
    fn bearer_token_from_header_invalid() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "Token something",
            "Bearer token extra",
            "bear token",
        ];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[test]
    fn current_user_accessors() {
        let user = CurrentUser(Principal {
            id: "usr_w1".to_string(),
            role: Role::Colaborador,
        });
        assert_eq!(user.id(), "usr_w1");
        assert_eq!(user.role(), Role::Colaborador);
    }
}
