//! Bearer token issuance and validation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::claims::{Claims, Principal, Role};
use super::error::AuthError;

/// Issues and validates the service's signed bearer tokens (HS256).
///
/// Built once at startup from the validated signing secret. Validation is a
/// pure function of the token, the key, and the clock; there is no
/// server-side revocation.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issue a token for a verified principal.
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: principal.id.clone(),
            role: principal.role.to_string(),
            iat: Some(now),
            exp: now + self.lifetime_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Validate a token and extract the principal it encodes.
    ///
    /// A validly signed token that lacks a subject or a known role is still
    /// rejected: the signature alone never yields a usable principal.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidClaims("missing subject"));
        }
        if claims.role.is_empty() {
            return Err(AuthError::InvalidClaims("missing role"));
        }
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| AuthError::InvalidClaims("unknown role"))?;

        Ok(Principal {
            id: claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    const SECRET: &str = "test-secret-for-unit-tests-minimum-32-chars-long";

    fn principal() -> Principal {
        Principal {
            id: "usr_test1".to_string(),
            role: Role::Supervisor,
        }
    }

    #[test]
    fn issue_then_validate_round_trips() {
        let tokens = TokenService::new(SECRET, 3600);

        let token = tokens.issue(&principal()).unwrap();
        let validated = tokens.validate(&token).unwrap();

        assert_eq!(validated, principal());
    }

    #[test]
    fn expired_token_fails_with_expired() {
        // Issue with a negative lifetime so exp is already in the past.
        let tokens = TokenService::new(SECRET, -3600);

        let token = tokens.issue(&principal()).unwrap();
        let err = tokens.validate(&token).unwrap_err();

        assert!(matches!(err, AuthError::Expired), "got {err:?}");
    }

    #[test]
    fn garbage_token_fails_as_malformed() {
        let tokens = TokenService::new(SECRET, 3600);

        let err = tokens.validate("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn token_signed_with_other_key_fails_as_malformed() {
        let issuer = TokenService::new("another-secret-that-is-also-32-chars!!", 3600);
        let tokens = TokenService::new(SECRET, 3600);

        let token = issuer.issue(&principal()).unwrap();
        let err = tokens.validate(&token).unwrap_err();

        assert!(matches!(err, AuthError::Malformed(_)), "got {err:?}");
    }

    #[derive(Serialize)]
    struct PartialClaims {
        #[serde(skip_serializing_if = "Option::is_none")]
        sub: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<&'static str>,
        exp: i64,
    }

    fn sign_partial(sub: Option<&'static str>, role: Option<&'static str>) -> String {
        let claims = PartialClaims {
            sub,
            role,
            exp: Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn validly_signed_token_without_subject_is_rejected() {
        let tokens = TokenService::new(SECRET, 3600);

        let token = sign_partial(None, Some("ADMIN"));
        let err = tokens.validate(&token).unwrap_err();

        assert!(matches!(err, AuthError::InvalidClaims(_)), "got {err:?}");
    }

    #[test]
    fn validly_signed_token_without_role_is_rejected() {
        let tokens = TokenService::new(SECRET, 3600);

        let token = sign_partial(Some("usr_test1"), None);
        let err = tokens.validate(&token).unwrap_err();

        assert!(matches!(err, AuthError::InvalidClaims(_)), "got {err:?}");
    }

    #[test]
    fn token_with_role_outside_closed_set_is_rejected() {
        let tokens = TokenService::new(SECRET, 3600);

        let token = sign_partial(Some("usr_test1"), Some("SUPERUSER"));
        let err = tokens.validate(&token).unwrap_err();

        assert!(matches!(err, AuthError::InvalidClaims(_)), "got {err:?}");
    }
}
