use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no token supplied")]
    MissingToken,
    #[error("token is malformed or its signature does not validate")]
    Unauthenticated,
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("role {actual} may not access a topic that requires {required}")]
    Forbidden { required: Role, actual: Role },
}

impl AuthError {
    /// Text placed in the `{"error": ...}` frame sent to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Token is required",
            AuthError::Unauthenticated | AuthError::Expired(_) => "Invalid or expired token",
            AuthError::Forbidden { .. } => "Unauthorized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
    #[serde(other)]
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

/// Account ids are numeric in practice but older tokens carry them as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

/// Payload of a dashboard session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub no_reg: Option<serde_json::Value>,
    #[serde(default)]
    pub session_id: Option<Identifier>,
    /// Expiry in milliseconds since the epoch
    #[serde(default)]
    pub expired_at: Option<i64>,
    /// Registered JWT expiry in seconds, used when `expiredAt` is absent
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub device: Option<String>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match (self.expired_at, self.exp) {
            (Some(ms), _) => Utc.timestamp_millis_opt(ms).single(),
            (None, Some(secs)) => Utc.timestamp_opt(secs, 0).single(),
            (None, None) => None,
        }
    }

    /// A token carrying no readable expiry is rejected as unauthenticated.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        let expires_at = self.expires_at().ok_or(AuthError::Unauthenticated)?;
        if expires_at <= now {
            return Err(AuthError::Expired(expires_at));
        }
        Ok(())
    }
}

/// Validates HMAC-signed bearer tokens against the shared secret.
#[derive(Clone)]
pub struct CredentialVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry lives in the custom `expiredAt` claim and is checked against our clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decodes `token` and rejects it when it is missing, forged or expired.
    pub fn verify(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let token = token.ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            tracing::debug!("token rejected: {err}");
            AuthError::Unauthenticated
        })?;

        data.claims.check_expiry(now)?;
        Ok(data.claims)
    }

    /// `verify` plus a role check when the topic demands one.
    pub fn authorize(
        &self,
        token: Option<&str>,
        required: Option<&Role>,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let claims = self.verify(token, now)?;

        if let Some(required) = required {
            let actual = claims.role.clone().unwrap_or(Role::Other);
            if &actual != required {
                return Err(AuthError::Forbidden {
                    required: required.clone(),
                    actual,
                });
            }
        }

        Ok(claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    pub(crate) const SECRET: &str = "fleet-secret";

    pub(crate) fn token_with(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) fn session_token(role: &str, expires_at: DateTime<Utc>) -> String {
        token_with(
            json!({
                "id": 1,
                "role": role,
                "email": "ops@example.com",
                "noReg": "0812",
                "expiredAt": expires_at.timestamp_millis(),
                "device": "Desktop",
                "sessionId": 42,
            }),
            SECRET,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_admin_token() {
        let verifier = CredentialVerifier::new(SECRET);
        let token = session_token("ADMIN", now() + Duration::hours(1));

        let claims = verifier
            .authorize(Some(&token), Some(&Role::Admin), now())
            .unwrap();

        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.session_id, Some(Identifier::Number(42)));
        assert_eq!(claims.device.as_deref(), Some("Desktop"));
    }

    #[test]
    fn test_missing_token() {
        let verifier = CredentialVerifier::new(SECRET);
        assert_eq!(verifier.verify(None, now()), Err(AuthError::MissingToken));
        assert_eq!(verifier.verify(Some("  "), now()), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_garbage_and_wrong_secret_are_unauthenticated() {
        let verifier = CredentialVerifier::new(SECRET);
        assert_eq!(
            verifier.verify(Some("not.a.jwt"), now()),
            Err(AuthError::Unauthenticated)
        );

        let forged = token_with(
            json!({"role": "ADMIN", "expiredAt": (now() + Duration::hours(1)).timestamp_millis()}),
            "other-secret",
        );
        assert_eq!(
            verifier.verify(Some(&forged), now()),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let verifier = CredentialVerifier::new(SECRET);
        let token = session_token("ADMIN", now());

        let err = verifier.verify(Some(&token), now()).unwrap_err();
        assert!(matches!(err, AuthError::Expired(_)));
        assert_eq!(err.client_message(), "Invalid or expired token");
    }

    #[test]
    fn test_exp_seconds_used_without_expired_at() {
        let verifier = CredentialVerifier::new(SECRET);
        let token = token_with(
            json!({"role": "USER", "exp": (now() + Duration::minutes(5)).timestamp()}),
            SECRET,
        );
        assert_ok!(verifier.verify(Some(&token), now()));

        let stale = token_with(
            json!({"role": "USER", "exp": (now() - Duration::minutes(5)).timestamp()}),
            SECRET,
        );
        assert!(matches!(
            verifier.verify(Some(&stale), now()),
            Err(AuthError::Expired(_))
        ));
    }

    #[test]
    fn test_token_without_expiry_is_rejected() {
        let verifier = CredentialVerifier::new(SECRET);
        let token = token_with(json!({"role": "ADMIN"}), SECRET);
        assert_eq!(
            verifier.verify(Some(&token), now()),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_role_mismatch_is_forbidden() {
        let verifier = CredentialVerifier::new(SECRET);
        let token = session_token("USER", now() + Duration::hours(1));

        let err = assert_err!(verifier.authorize(Some(&token), Some(&Role::Admin), now()));
        assert_eq!(
            err,
            AuthError::Forbidden {
                required: Role::Admin,
                actual: Role::User
            }
        );
        assert_eq!(err.client_message(), "Unauthorized");

        // No role requirement: any valid token passes.
        assert_ok!(verifier.authorize(Some(&token), None, now()));
    }

    #[test]
    fn test_unknown_role_deserializes_as_other() {
        let claims: Claims = serde_json::from_value(json!({"role": "SUPERVISOR"})).unwrap();
        assert_eq!(claims.role, Some(Role::Other));
    }
}
