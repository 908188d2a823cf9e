//! Token claims, roles, and the principal extracted from a valid token.

use serde::{Deserialize, Serialize};

/// Staff role. Closed set; every stored user and every token carries
/// exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Supervisor,
    Colaborador,
}

impl Role {
    /// Every member of the closed set, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Supervisor, Role::Colaborador];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Supervisor => write!(f, "SUPERVISOR"),
            Role::Colaborador => write!(f, "COLABORADOR"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "SUPERVISOR" => Ok(Role::Supervisor),
            "COLABORADOR" => Ok(Role::Colaborador),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Bearer token claims.
///
/// `sub` and `role` default to empty on decode so that a validly signed
/// token missing either claim can be rejected as incomplete rather than
/// failing as undecodable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    #[serde(default)]
    pub sub: String,

    /// Role name granted to the subject.
    #[serde(default)]
    pub role: String,

    /// Issued at (as Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

/// The authenticated identity+role pair.
///
/// Produced only by credential verification or token validation; never
/// constructed from unverified input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}
