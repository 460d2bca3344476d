//! Session tokens (HS256 JWT carrying the organizer id)

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;
use super::models::Claims;

/// Session signing configuration, loaded once at startup
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
    expiration_hours: u64,
}

impl SessionConfig {
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// `None` when `JWT_SECRET` is unset or empty
    pub fn from_env() -> Option<Self> {
        let secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty())?;
        let expiration_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);
        Some(Self::new(secret, expiration_hours))
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

pub(crate) fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Mints and verifies session tokens
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: usize,
}

impl SessionIssuer {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: usize::try_from(config.expiration_hours.saturating_mul(3600))
                .unwrap_or(usize::MAX),
        }
    }

    /// Create a session token for an organizer
    pub fn issue(&self, organizer_id: &str) -> Result<String, AuthError> {
        let now = unix_now();
        let claims = Claims {
            organizer_id: organizer_id.to_string(),
            exp: now.saturating_add(self.ttl_secs),
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a session token and return the organizer id it carries
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims.organizer_id)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::SessionInvalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn issuer(secret: &str) -> SessionIssuer {
        SessionIssuer::new(&SessionConfig::new(secret.to_string(), 24))
    }

    #[test]
    fn test_issue_and_verify() {
        let sessions = issuer("test-secret");

        let token = sessions.issue("org_123").unwrap();
        assert_eq!(sessions.verify(&token).unwrap(), "org_123");
    }

    #[test]
    fn test_malformed_token() {
        let sessions = issuer("test-secret");
        assert_matches!(
            sessions.verify("invalid.token.here"),
            Err(AuthError::SessionInvalid)
        );
    }

    #[test]
    fn test_wrong_signing_key() {
        let token = issuer("secret-a").issue("org_123").unwrap();
        assert_matches!(
            issuer("secret-b").verify(&token),
            Err(AuthError::SessionInvalid)
        );
    }

    #[test]
    fn test_huge_expiration_saturates() {
        let sessions = SessionIssuer::new(&SessionConfig::new(
            "test-secret".to_string(),
            u64::MAX / 1000,
        ));
        assert_eq!(sessions.ttl_secs, usize::MAX);

        let token = sessions.issue("org_123").unwrap();
        assert_eq!(sessions.verify(&token).unwrap(), "org_123");
    }

    #[test]
    fn test_expired_token() {
        let sessions = issuer("test-secret");
        let now = unix_now();
        let claims = Claims {
            organizer_id: "org_123".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(&Header::default(), &claims, &sessions.encoding_key).unwrap();

        assert_matches!(sessions.verify(&token), Err(AuthError::SessionExpired));
    }
}
