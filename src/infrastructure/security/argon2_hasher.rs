use argon2::password_hash::SaltString;
use argon2::{
  Algorithm, Argon2, Params, Version,
  password_hash::{
    PasswordHash as Argon2PasswordHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier,
  },
};

use crate::domain::account::errors::{AccountError, PasswordRejection};
use crate::domain::account::ports::PasswordHasher;
use crate::infrastructure::config::HashingConfig;

/// Argon2id password hasher implementation
///
/// Uses the Argon2id algorithm with secure parameters:
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 thread
/// - Algorithm: Argon2id (resistant to both side-channel and GPU attacks)
pub struct Argon2PasswordHasher {
  argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
  /// Creates a new Argon2PasswordHasher with the default parameters
  pub fn new() -> Result<Self, AccountError> {
    Self::from_config(&HashingConfig::default())
  }

  /// Creates a hasher with the costs from configuration
  pub fn from_config(config: &HashingConfig) -> Result<Self, AccountError> {
    // Output length: 32 bytes (default)
    let output_len = Some(32);

    let params = Params::new(
      config.memory_cost_kib,
      config.time_cost,
      config.parallelism,
      output_len,
    )
    .map_err(|e| AccountError::Hashing(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    Ok(Self { argon2 })
  }
}

impl Default for Argon2PasswordHasher {
  fn default() -> Self {
    Self {
      argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
    }
  }
}

impl PasswordHasher for Argon2PasswordHasher {
  /// Hashes a plain text password using Argon2id
  ///
  /// # Returns
  /// * `Ok(String)` - The PHC-formatted hash
  /// * `Err(AccountError)` - If hashing fails
  fn hash(&self, plaintext: &str) -> Result<String, AccountError> {
    // Generate a random salt using the OS's cryptographically secure RNG
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    let hash = self
      .argon2
      .hash_password(plaintext.as_bytes(), &salt)
      .map_err(|e| AccountError::Hashing(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
  }

  /// Verifies a plain text password against a hashed password
  ///
  /// Uses constant-time comparison to prevent timing attacks
  ///
  /// # Returns
  /// * `Ok(true)` - If the password matches
  /// * `Ok(false)` - If the password does not match
  /// * `Err(AccountError)` - If the stored hash cannot be parsed
  fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AccountError> {
    // Any PHC parse failure means the stored value is not a usable hash
    let parsed_hash = Argon2PasswordHash::new(hash)
      .map_err(|_| AccountError::InvalidPassword(PasswordRejection::InvalidHash))?;

    match self
      .argon2
      .verify_password(plaintext.as_bytes(), &parsed_hash)
    {
      Ok(_) => Ok(true),
      Err(argon2::password_hash::Error::Password) => Ok(false),
      Err(e) => Err(AccountError::Hashing(format!(
        "Password verification failed: {}",
        e
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hash_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();

    let hash = hasher.hash("test_password_123").unwrap();

    assert!(!hash.is_empty());
    assert!(hash.starts_with("$argon2id$"));
  }

  #[test]
  fn test_verify_correct_and_incorrect_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let hash = hasher.hash("test_password_123").unwrap();

    assert!(hasher.verify("test_password_123", &hash).unwrap());
    assert!(!hasher.verify("wrong_password", &hash).unwrap());
  }

  #[test]
  fn test_hash_produces_different_salts() {
    let hasher = Argon2PasswordHasher::new().unwrap();

    let hash1 = hasher.hash("test_password_123").unwrap();
    let hash2 = hasher.hash("test_password_123").unwrap();

    // Same password should produce different hashes due to random salt
    assert_ne!(hash1, hash2);
    assert!(hasher.verify("test_password_123", &hash1).unwrap());
    assert!(hasher.verify("test_password_123", &hash2).unwrap());
  }

  #[test]
  fn test_verify_invalid_hash_format() {
    let hasher = Argon2PasswordHasher::new().unwrap();

    for hash in [
      "invalid_hash",
      "$argon2id$v=19$m=19456,t=2,p=1$!!!!$abc",
    ] {
      assert_eq!(
        hasher.verify("test_password_123", hash),
        Err(AccountError::InvalidPassword(PasswordRejection::InvalidHash)),
        "{hash} should be rejected as an invalid hash"
      );
    }
  }

  #[test]
  fn test_argon2_parameters_from_config() {
    let config = HashingConfig {
      memory_cost_kib: 8192,
      time_cost: 1,
      parallelism: 1,
    };
    let hasher = Argon2PasswordHasher::from_config(&config).unwrap();
    let hash = hasher.hash("test_password_123").unwrap();

    let parsed = Argon2PasswordHash::new(&hash).unwrap();
    assert_eq!(parsed.version, Some(Version::V0x13 as u32));
    assert!(hash.contains("m=8192,t=1,p=1"));
  }

  #[test]
  fn test_invalid_parameters_are_rejected() {
    let config = HashingConfig {
      memory_cost_kib: 1,
      time_cost: 0,
      parallelism: 1,
    };

    assert!(matches!(
      Argon2PasswordHasher::from_config(&config),
      Err(AccountError::Hashing(_))
    ));
  }
}
