use bcrypt::BcryptError;

use crate::config;

/// Hash a password with bcrypt at the configured work factor.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_work_factor)
}

/// Check a password against a stored bcrypt hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or_else(|e| {
        tracing::debug!("Unverifiable password hash: {}", e);
        false
    })
}
