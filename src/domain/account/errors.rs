use thiserror::Error;

/// Main account error type
///
/// Every validation failure in the account value objects surfaces as one of
/// these variants. None of them are fatal; callers decide whether to re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
  #[error("Missing required value: {0}")]
  MissingValue(&'static str),

  #[error("Invalid email: {0}")]
  InvalidEmail(String),

  #[error("Invalid password: {0}")]
  InvalidPassword(PasswordRejection),

  #[error("Invalid verification code: {0}")]
  InvalidVerificationCode(CodeRejection),

  #[error("Password hashing failed: {0}")]
  Hashing(String),

  #[error("Invalid encoding: {0}")]
  InvalidEncoding(String),

  #[error("Invalid password policy: {0}")]
  InvalidPolicy(String),
}

/// Reasons a password is refused, at construction or at verification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordRejection {
  #[error("password is empty")]
  Blank,

  #[error("password is too short (minimum {min} characters)")]
  TooShort { min: usize },

  #[error("password is too long (maximum {max} characters)")]
  TooLong { max: usize },

  #[error("password has expired and must be changed")]
  Expired,

  #[error("stored hash is not a valid PHC string")]
  InvalidHash,
}

/// Reasons a presented verification code is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodeRejection {
  #[error("code is empty")]
  Blank,

  #[error("code must be exactly {expected} characters")]
  WrongLength { expected: usize },

  #[error("code does not match")]
  Mismatch,

  #[error("this code is already verified")]
  AlreadyVerified,

  #[error("this code has expired")]
  Expired,

  #[error("no verification code was issued")]
  NotIssued,

  #[error("code must be uppercase alphanumeric")]
  Malformed,
}

impl From<PasswordRejection> for AccountError {
  fn from(rejection: PasswordRejection) -> Self {
    AccountError::InvalidPassword(rejection)
  }
}

impl From<CodeRejection> for AccountError {
  fn from(rejection: CodeRejection) -> Self {
    AccountError::InvalidVerificationCode(rejection)
  }
}

impl From<argon2::password_hash::Error> for AccountError {
  fn from(error: argon2::password_hash::Error) -> Self {
    use argon2::password_hash::Error;
    match error {
      // Hash parsing/format errors
      Error::PhcStringField | Error::PhcStringTrailingData => {
        AccountError::InvalidPassword(PasswordRejection::InvalidHash)
      }
      _ => AccountError::Hashing(error.to_string()),
    }
  }
}
