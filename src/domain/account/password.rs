use argon2::PasswordHash as Argon2PasswordHash;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use zeroize::Zeroizing;

use super::errors::{AccountError, PasswordRejection};
use super::ports::PasswordHasher;
use crate::domain::shared::ports::Clock;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.?";

/// Length and aging rules applied to passwords
///
/// Always satisfies `1 <= min_length <= max_length` and a positive `max_age`,
/// so a password generated under the policy is accepted by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
  min_length: usize,
  max_length: usize,
  max_age: Duration,
}

impl PasswordPolicy {
  pub const DEFAULT_MIN_LENGTH: usize = 8;
  pub const DEFAULT_MAX_LENGTH: usize = 32;
  pub const GENERATED_LENGTH: usize = 16;

  /// Creates a policy after checking its bounds
  pub fn new(min_length: usize, max_length: usize, max_age: Duration) -> Result<Self, AccountError> {
    if max_length == 0 {
      return Err(AccountError::InvalidPolicy(
        "maximum length must be at least 1".to_string(),
      ));
    }

    if min_length > max_length {
      return Err(AccountError::InvalidPolicy(format!(
        "minimum length {} exceeds maximum length {}",
        min_length, max_length
      )));
    }

    if max_age <= Duration::zero() {
      return Err(AccountError::InvalidPolicy(
        "maximum age must be positive".to_string(),
      ));
    }

    Ok(Self {
      min_length,
      max_length,
      max_age,
    })
  }

  pub fn min_length(&self) -> usize {
    self.min_length
  }

  pub fn max_length(&self) -> usize {
    self.max_length
  }

  /// Age at which a password expires and must be replaced
  pub fn max_age(&self) -> Duration {
    self.max_age
  }

  fn check_length(&self, plaintext: &str) -> Result<(), PasswordRejection> {
    let length = plaintext.chars().count();

    if length < self.min_length {
      return Err(PasswordRejection::TooShort {
        min: self.min_length,
      });
    }

    if length > self.max_length {
      return Err(PasswordRejection::TooLong {
        max: self.max_length,
      });
    }

    Ok(())
  }
}

impl Default for PasswordPolicy {
  fn default() -> Self {
    Self {
      min_length: Self::DEFAULT_MIN_LENGTH,
      max_length: Self::DEFAULT_MAX_LENGTH,
      max_age: Duration::days(1),
    }
  }
}

/// Hashed credential with an aging window
///
/// Only the PHC hash and the creation instant are kept; the plaintext is
/// wiped as soon as it has been hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
  hash: String,
  created_at_utc: DateTime<Utc>,
  policy: PasswordPolicy,
}

impl Password {
  /// Validates and hashes a plaintext password under the default policy
  pub fn new(
    plaintext: &str,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
  ) -> Result<Self, AccountError> {
    Self::with_policy(plaintext, PasswordPolicy::default(), hasher, clock)
  }

  /// Validates and hashes a plaintext password under `policy`
  pub fn with_policy(
    plaintext: &str,
    policy: PasswordPolicy,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
  ) -> Result<Self, AccountError> {
    let plaintext = Zeroizing::new(plaintext.to_owned());

    if plaintext.trim().is_empty() {
      return Err(PasswordRejection::Blank.into());
    }

    policy.check_length(&plaintext)?;

    let hash = hasher.hash(&plaintext)?;
    let created_at_utc = clock.utc_now();

    tracing::debug!(%created_at_utc, "Password hashed");

    Ok(Self {
      hash,
      created_at_utc,
      policy,
    })
  }

  /// Same as [`Password::new`] for input that may be absent
  pub fn try_from_option(
    plaintext: Option<&str>,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
  ) -> Result<Self, AccountError> {
    match plaintext {
      Some(plaintext) => Self::new(plaintext, hasher, clock),
      None => Err(PasswordRejection::Blank.into()),
    }
  }

  /// Rebuilds a password from a stored PHC hash
  pub fn restore(
    hash: impl Into<String>,
    created_at_utc: DateTime<Utc>,
    policy: PasswordPolicy,
  ) -> Result<Self, AccountError> {
    let hash = hash.into();

    Argon2PasswordHash::new(&hash)
      .map_err(|_| AccountError::InvalidPassword(PasswordRejection::InvalidHash))?;

    Ok(Self {
      hash,
      created_at_utc,
      policy,
    })
  }

  /// Generates a strong plaintext password under the default policy
  pub fn generate() -> String {
    Self::generate_with_policy(&PasswordPolicy::default())
  }

  /// Generates a plaintext password that satisfies `policy`
  ///
  /// Contains at least one uppercase letter, lowercase letter, digit and
  /// symbol whenever the policy leaves room for four characters.
  pub fn generate_with_policy(policy: &PasswordPolicy) -> String {
    let length = PasswordPolicy::GENERATED_LENGTH
      .max(policy.min_length)
      .min(policy.max_length);

    let mut rng = rand::thread_rng();
    let classes = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

    let mut chars: Vec<u8> = classes
      .iter()
      .take(length)
      .map(|class| class[rng.gen_range(0..class.len())])
      .collect();

    while chars.len() < length {
      let class = classes[rng.gen_range(0..classes.len())];
      chars.push(class[rng.gen_range(0..class.len())]);
    }

    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
  }

  /// Fails when the password is too old to be used
  pub fn verify(&self, clock: &dyn Clock) -> Result<(), AccountError> {
    if self.must_change(clock) {
      tracing::warn!(created_at_utc = %self.created_at_utc, "Password expired");
      return Err(PasswordRejection::Expired.into());
    }

    Ok(())
  }

  /// Checks a login attempt against the stored hash
  ///
  /// Aging is checked first, so an expired password never matches.
  pub fn matches(
    &self,
    candidate: &str,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
  ) -> Result<bool, AccountError> {
    self.verify(clock)?;
    hasher.verify(candidate, &self.hash)
  }

  pub fn hash(&self) -> &str {
    &self.hash
  }

  pub fn created_at_utc(&self) -> DateTime<Utc> {
    self.created_at_utc
  }

  pub fn policy(&self) -> &PasswordPolicy {
    &self.policy
  }

  pub fn age(&self, clock: &dyn Clock) -> Duration {
    clock.utc_now() - self.created_at_utc
  }

  pub fn is_expired(&self, clock: &dyn Clock) -> bool {
    self.age(clock) >= self.policy.max_age
  }

  /// An expired password has to be replaced before it can be used again
  pub fn must_change(&self, clock: &dyn Clock) -> bool {
    self.is_expired(clock)
  }

  pub fn into_inner(self) -> String {
    self.hash
  }
}

// The hash is the only representation a password has
impl fmt::Debug for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Password")
      .field("hash", &self.hash)
      .field("created_at_utc", &self.created_at_utc)
      .finish()
  }
}

impl fmt::Display for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.hash)
  }
}

impl AsRef<str> for Password {
  fn as_ref(&self) -> &str {
    &self.hash
  }
}

impl From<Password> for String {
  fn from(password: Password) -> Self {
    password.hash
  }
}
