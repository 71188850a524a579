use super::errors::AccountError;

/// Service trait for password hashing operations
///
/// Synchronous on purpose: the value objects have no suspension points and
/// hashing is CPU bound.
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password into a PHC string
  fn hash(&self, plaintext: &str) -> Result<String, AccountError>;

  /// Verifies a plain text password against a PHC string
  fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AccountError>;
}
