//! Password hashing via bcrypt.

use std::sync::OnceLock;

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 10;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    validate_cost(cost)?;
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Burn roughly the time of a real verification, for unknown usernames.
pub fn dummy_verify(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    let hash = DUMMY_HASH.get_or_init(|| bcrypt::hash("catalog-dummy-password", DEFAULT_COST).ok());
    if let Some(hash) = hash {
        let _ = bcrypt::verify(password, hash);
    }
}

/// Reject costs bcrypt would refuse.
pub fn validate_cost(cost: u32) -> Result<(), AuthError> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(AuthError::ValidationError(format!(
            "invalid cost={cost} (valid: {MIN_COST}..{MAX_COST})"
        )));
    }
    Ok(())
}
