use chrono::Duration;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{AccountError, CodeRejection};
use super::verification_code::VerificationCode;
use crate::domain::shared::extensions::StringExtensions;
use crate::domain::shared::ports::Clock;

lazy_static! {
  static ref EMAIL_REGEX: Regex =
    Regex::new(r"^\w+([-+.']\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$").expect("valid email regex");
}

/// Normalized email address
///
/// The address is trimmed and lower-cased before it is validated, so two
/// spellings of the same mailbox compare equal. The verification code, when
/// present, belongs to this email alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
  address: String,
  hash: String,
  verification_code: Option<VerificationCode>,
}

impl Email {
  /// Creates a new Email after normalization and validation
  pub fn new(address: impl AsRef<str>) -> Result<Self, AccountError> {
    let address = Self::normalize(address.as_ref())?;
    let hash = address.to_base64();

    Ok(Self {
      address,
      hash,
      verification_code: None,
    })
  }

  /// Creates an Email with a freshly issued verification code attached
  pub fn with_verification(
    address: impl AsRef<str>,
    clock: &dyn Clock,
  ) -> Result<Self, AccountError> {
    Self::with_verification_ttl(address, clock, VerificationCode::default_ttl())
  }

  /// Same as [`Email::with_verification`] with a custom code lifetime
  pub fn with_verification_ttl(
    address: impl AsRef<str>,
    clock: &dyn Clock,
    ttl: Duration,
  ) -> Result<Self, AccountError> {
    let mut email = Self::new(address)?;
    email.verification_code = Some(VerificationCode::with_ttl(clock, ttl));

    tracing::debug!(email_hash = %email.hash, "Email created with verification code");

    Ok(email)
  }

  /// Same as [`Email::new`] for input that may be absent
  pub fn try_from_option(address: Option<&str>) -> Result<Self, AccountError> {
    match address {
      Some(address) => Self::new(address),
      None => Err(AccountError::MissingValue("email")),
    }
  }

  fn normalize(address: &str) -> Result<String, AccountError> {
    let address = address.trim().to_lowercase();

    if !EMAIL_REGEX.is_match(&address) {
      return Err(AccountError::InvalidEmail(address));
    }

    Ok(address)
  }

  /// Confirms the email with the code that was sent to it
  pub fn verify(&mut self, code: &str, clock: &dyn Clock) -> Result<(), AccountError> {
    match self.verification_code.as_mut() {
      Some(verification_code) => verification_code.verify(code, clock),
      None => {
        tracing::warn!(email_hash = %self.hash, "Verification attempted without an issued code");
        Err(CodeRejection::NotIssued.into())
      }
    }
  }

  /// True once the attached code has been consumed
  pub fn is_verified(&self) -> bool {
    self
      .verification_code
      .as_ref()
      .is_some_and(VerificationCode::is_verified)
  }

  pub fn address(&self) -> &str {
    &self.address
  }

  /// Base64 of the normalized address, for lookups
  pub fn hash(&self) -> &str {
    &self.hash
  }

  pub fn verification_code(&self) -> Option<&VerificationCode> {
    self.verification_code.as_ref()
  }

  /// Recovers the address from its hash
  pub fn decode_hash(hash: &str) -> Result<Self, AccountError> {
    Self::new(hash.decode_base64()?)
  }

  /// Returns the email as a string slice
  pub fn as_str(&self) -> &str {
    &self.address
  }

  /// Consumes self and returns the normalized address
  pub fn into_inner(self) -> String {
    self.address
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.address)
  }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str {
    &self.address
  }
}

impl FromStr for Email {
  type Err = AccountError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for Email {
  type Error = AccountError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Email> for String {
  fn from(email: Email) -> Self {
    email.address
  }
}
