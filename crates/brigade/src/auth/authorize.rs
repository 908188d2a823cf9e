//! The access decision point.

use thiserror::Error;

use super::claims::{Principal, Role};

/// Authorization denial reasons.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// Roles are required but no authenticated principal is present.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal's role is not in the required set.
    #[error("insufficient role")]
    InsufficientRole,
}

/// Decide whether `principal` may invoke an operation gated by `required`.
///
/// An empty required set allows every caller, authenticated or not. The
/// required set is data supplied at the call site; this is the single shared
/// decision function for every endpoint.
pub fn authorize(principal: Option<&Principal>, required: &[Role]) -> Result<(), AuthzError> {
    if required.is_empty() {
        return Ok(());
    }

    let principal = principal.ok_or(AuthzError::Unauthenticated)?;

    if required.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: "usr_test1".to_string(),
            role,
        }
    }

    #[test]
    fn empty_required_set_allows_everyone() {
        assert!(authorize(None, &[]).is_ok());
        for role in Role::ALL {
            assert!(authorize(Some(&principal(role)), &[]).is_ok());
        }
    }

    #[test]
    fn missing_principal_is_unauthenticated_not_insufficient() {
        let err = authorize(None, &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthzError::Unauthenticated);
    }

    #[test]
    fn allows_iff_role_is_in_required_set() {
        let required = [Role::Supervisor, Role::Admin];

        for role in Role::ALL {
            let result = authorize(Some(&principal(role)), &required);
            if required.contains(&role) {
                assert!(result.is_ok(), "{role} should be allowed");
            } else {
                assert_eq!(result.unwrap_err(), AuthzError::InsufficientRole);
            }
        }
    }

    #[test]
    fn single_role_set() {
        assert!(authorize(Some(&principal(Role::Colaborador)), &[Role::Colaborador]).is_ok());
        assert_eq!(
            authorize(Some(&principal(Role::Admin)), &[Role::Colaborador]).unwrap_err(),
            AuthzError::InsufficientRole
        );
    }
}
