//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use uuid::Uuid;

use shelf_core::error::AppError;
use shelf_core::result::AppResult;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a random secret, verified against when the username is unknown.
    decoy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the default Argon2id cost parameters.
    pub fn new() -> AppResult<Self> {
        Self::from_params(Params::default())
    }

    /// Creates a hasher with explicit memory (KiB) and iteration costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Self::from_params(params)
    }

    fn from_params(params: Params) -> AppResult<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = hash_with(&argon2, &Uuid::new_v4().to_string())?;
        Ok(Self { argon2, decoy_hash })
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        hash_with(&self.argon2, password)
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        verify_with(&self.argon2, password, hash)
    }

    /// Verifies on the blocking pool so the async workers stay responsive.
    ///
    /// Passing `None` as the hash verifies against the decoy and always
    /// yields `Ok(false)`, at the same cost as a real comparison. Once
    /// started, the comparison runs to completion even if the caller is
    /// dropped.
    pub async fn verify_blocking(&self, password: &str, hash: Option<&str>) -> AppResult<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let is_decoy = hash.is_none();
        let hash = hash.unwrap_or(self.decoy_hash.as_str()).to_string();

        let matched = tokio::task::spawn_blocking(move || verify_with(&argon2, &password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))??;

        Ok(matched && !is_decoy)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_with(argon2: &Argon2<'_>, password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::internal(format!(
            "Password verification failed: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1024, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = make_hasher();
        let hash = hasher.hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret", &hash).unwrap());
        assert!(!hasher.verify_password("Secret", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = make_hasher();
        let a = hasher.hash_password("secret").unwrap();
        let b = hasher.hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let hasher = make_hasher();
        let err = hasher.verify_password("secret", "not-a-hash").unwrap_err();
        assert_eq!(err.kind, shelf_core::error::ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_verify_blocking() {
        let hasher = make_hasher();
        let hash = hasher.hash_password("secret").unwrap();
        assert!(hasher.verify_blocking("secret", Some(&hash)).await.unwrap());
        assert!(!hasher.verify_blocking("wrong", Some(&hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_decoy_never_matches() {
        let hasher = make_hasher();
        assert!(!hasher.verify_blocking("anything", None).await.unwrap());
        assert!(!hasher.verify_blocking("", None).await.unwrap());
    }
}
