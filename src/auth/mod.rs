pub mod session;

/// Hashes a password for storage. bcrypt's default cost is deliberate;
/// registration is not a hot path.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Constant-time verification; a malformed stored hash counts as a failed
/// login rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
