use bcrypt::{hash, verify, DEFAULT_COST};

/// bcrypt only consumes the first 72 bytes of input. Anything longer is
/// truncated identically at hash and verify time so the behavior stays
/// deterministic across both paths.
const MAX_PASSWORD_BYTES: usize = 72;

/// Newtype for plaintext passwords to prevent accidental logging
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Newtype for password hashes
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn truncated(password: &Password) -> &[u8] {
    let bytes = password.as_str().as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hash a password using bcrypt with the default cost factor.
///
/// Salt generation is handled by the bcrypt implementation and encoded
/// into the resulting hash string.
pub fn hash_password(password: &Password) -> Result<PasswordHashString, anyhow::Error> {
    let password_hash = hash(truncated(password), DEFAULT_COST)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a stored hash.
///
/// Returns `false` on mismatch and on malformed hashes; distinguishing the
/// two would leak information about the stored credential.
pub fn verify_password(password: &Password, password_hash: &PasswordHashString) -> bool {
    verify(truncated(password), password_hash.as_str()).unwrap_or(false)
}
