//! Password hashing using bcrypt

use std::sync::OnceLock;

/// Work factor applied to every new hash
pub const HASH_COST: u32 = 12;

/// Hash a password with bcrypt at [`HASH_COST`]
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password("no-such-account").ok())
        .as_deref()
}

/// Run a full-cost verification whose result is discarded, so that a login
/// for an unknown email costs the same as one with a wrong password
pub fn verify_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "SecurePassword123";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$2b$12$"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_dummy_hash_has_full_cost() {
        let hash = dummy_hash().unwrap();
        assert!(hash.starts_with("$2b$12$"));
        assert_eq!(dummy_hash().unwrap(), hash);
        verify_dummy("anything");
    }
}
