use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;

use super::errors::{AccountError, CodeRejection};
use crate::domain::shared::ports::Clock;

/// Lifecycle of a verification code
///
/// A code is either waiting to be consumed, with an expiry, or consumed, with
/// the instant it happened. There is no way back from `Verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
  Issued { expires_at_utc: DateTime<Utc> },
  Verified { verified_at_utc: DateTime<Utc> },
}

/// One-time, short-lived confirmation code
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode {
  code: String,
  state: VerificationState,
}

impl VerificationCode {
  pub const LENGTH: usize = 6;

  /// Default lifetime of an issued code
  pub fn default_ttl() -> Duration {
    Duration::minutes(5)
  }

  /// Issues a fresh code that expires five minutes from `clock`'s now
  pub fn new(clock: &dyn Clock) -> Self {
    Self::with_ttl(clock, Self::default_ttl())
  }

  /// Issues a fresh code with a custom lifetime
  ///
  /// A lifetime that overflows the calendar saturates at the latest
  /// representable instant.
  pub fn with_ttl(clock: &dyn Clock, ttl: Duration) -> Self {
    let code = Self::generate_code();
    let expires_at_utc = clock
      .utc_now()
      .checked_add_signed(ttl)
      .unwrap_or(DateTime::<Utc>::MAX_UTC);

    tracing::debug!(%expires_at_utc, "Issued verification code");

    Self {
      code,
      state: VerificationState::Issued { expires_at_utc },
    }
  }

  /// Rebuilds a code loaded from storage
  pub fn restore(code: impl Into<String>, state: VerificationState) -> Result<Self, AccountError> {
    let code = code.into();

    if code.chars().count() != Self::LENGTH {
      return Err(CodeRejection::WrongLength {
        expected: Self::LENGTH,
      }
      .into());
    }

    if !code
      .chars()
      .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
      return Err(CodeRejection::Malformed.into());
    }

    Ok(Self { code, state })
  }

  /// Consumes the code
  ///
  /// Succeeds at most once, for an exact match presented strictly before the
  /// expiry. A failed attempt leaves the code untouched.
  pub fn verify(&mut self, presented: &str, clock: &dyn Clock) -> Result<(), AccountError> {
    let now = clock.utc_now();

    match self.check(presented, now) {
      Ok(()) => {
        let verified_at_utc = now;
        self.state = VerificationState::Verified { verified_at_utc };
        tracing::info!(%verified_at_utc, "Verification code consumed");
        Ok(())
      }
      Err(rejection) => {
        tracing::warn!(reason = %rejection, "Verification code rejected");
        Err(rejection.into())
      }
    }
  }

  fn check(&self, presented: &str, now: DateTime<Utc>) -> Result<(), CodeRejection> {
    if presented.trim().is_empty() {
      return Err(CodeRejection::Blank);
    }

    if presented.chars().count() != Self::LENGTH {
      return Err(CodeRejection::WrongLength {
        expected: Self::LENGTH,
      });
    }

    if presented != self.code {
      return Err(CodeRejection::Mismatch);
    }

    match self.state {
      VerificationState::Verified { .. } => Err(CodeRejection::AlreadyVerified),
      VerificationState::Issued { expires_at_utc } if now >= expires_at_utc => {
        Err(CodeRejection::Expired)
      }
      VerificationState::Issued { .. } => Ok(()),
    }
  }

  fn generate_code() -> String {
    rand::thread_rng()
      .sample_iter(&Alphanumeric)
      .take(Self::LENGTH)
      .map(|b| char::from(b).to_ascii_uppercase())
      .collect()
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn state(&self) -> VerificationState {
    self.state
  }

  /// Expiry instant, `None` once the code has been consumed
  pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
    match self.state {
      VerificationState::Issued { expires_at_utc } => Some(expires_at_utc),
      VerificationState::Verified { .. } => None,
    }
  }

  /// Consumption instant, `None` until the code has been consumed
  pub fn verified_at_utc(&self) -> Option<DateTime<Utc>> {
    match self.state {
      VerificationState::Issued { .. } => None,
      VerificationState::Verified { verified_at_utc } => Some(verified_at_utc),
    }
  }

  pub fn is_verified(&self) -> bool {
    matches!(self.state, VerificationState::Verified { .. })
  }

  /// True when an unconsumed code can no longer be consumed
  pub fn is_expired(&self, clock: &dyn Clock) -> bool {
    match self.state {
      VerificationState::Issued { expires_at_utc } => clock.utc_now() >= expires_at_utc,
      VerificationState::Verified { .. } => false,
    }
  }

  /// Verified with no expiry left
  ///
  /// Mirrors the predicate account flows already rely on: it reads true only
  /// after the code was consumed, not while it is pending.
  pub fn is_active(&self) -> bool {
    self.verified_at_utc().is_some() && self.expires_at_utc().is_none()
  }
}

// The code is a secret until consumed, keep it out of logs
impl fmt::Debug for VerificationCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VerificationCode")
      .field("code", &"***")
      .field("state", &self.state)
      .finish()
  }
}

impl fmt::Display for VerificationCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.code)
  }
}

impl AsRef<str> for VerificationCode {
  fn as_ref(&self) -> &str {
    &self.code
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::infrastructure::clock::FixedClock;
  use std::sync::atomic::{AtomicI64, Ordering};

  #[test]
  fn test_generates_six_uppercase_alphanumeric_chars() {
    let clock = FixedClock::now();

    for _ in 0..50 {
      let code = VerificationCode::new(&clock);
      assert_eq!(code.code().len(), VerificationCode::LENGTH);
      assert!(
        code
          .code()
          .chars()
          .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
      );
    }
  }

  #[test]
  fn test_expires_five_minutes_after_issue() {
    let clock = FixedClock::now();
    let now = clock.utc_now();

    let code = VerificationCode::new(&clock);

    assert_eq!(code.expires_at_utc(), Some(now + Duration::minutes(5)));
    assert!(code.expires_at_utc().unwrap() > now);
    assert_eq!(code.verified_at_utc(), None);
  }

  #[test]
  fn test_is_inactive_when_created() {
    let clock = FixedClock::now();
    let code = VerificationCode::new(&clock);

    assert!(!code.is_active());
    assert!(!code.is_verified());
  }

  #[test]
  fn test_verify_succeeds_once() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::new(&clock);
    let presented = code.code().to_string();

    clock.advance(Duration::minutes(1));
    code.verify(&presented, &clock).unwrap();

    assert_eq!(code.verified_at_utc(), Some(clock.utc_now()));
    assert_eq!(code.expires_at_utc(), None);
    assert!(code.is_active());

    assert_eq!(
      code.verify(&presented, &clock),
      Err(AccountError::InvalidVerificationCode(
        CodeRejection::AlreadyVerified
      ))
    );
  }

  #[test]
  fn test_verify_fails_after_expiry() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::new(&clock);
    let presented = code.code().to_string();

    clock.advance(Duration::hours(1));

    assert_eq!(
      code.verify(&presented, &clock),
      Err(AccountError::InvalidVerificationCode(CodeRejection::Expired))
    );
    assert!(code.is_expired(&clock));
    assert!(!code.is_verified());
  }

  #[test]
  fn test_verify_fails_exactly_at_expiry() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::new(&clock);
    let presented = code.code().to_string();

    clock.advance(Duration::minutes(5));

    assert_eq!(
      code.verify(&presented, &clock),
      Err(AccountError::InvalidVerificationCode(CodeRejection::Expired))
    );
  }

  #[test]
  fn test_verify_rejects_blank_codes() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::new(&clock);

    for presented in ["", "      ", "\t"] {
      assert_eq!(
        code.verify(presented, &clock),
        Err(AccountError::InvalidVerificationCode(CodeRejection::Blank))
      );
    }
  }

  #[test]
  fn test_verify_rejects_wrong_length() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::new(&clock);

    for presented in ["AB12", "AB12CD34EF"] {
      assert_eq!(
        code.verify(presented, &clock),
        Err(AccountError::InvalidVerificationCode(
          CodeRejection::WrongLength { expected: 6 }
        ))
      );
    }
  }

  #[test]
  fn test_verify_rejects_code_from_another_issue() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::restore(
      "ABC123",
      VerificationState::Issued {
        expires_at_utc: clock.utc_now() + Duration::minutes(5),
      },
    )
    .unwrap();

    assert_eq!(
      code.verify("XYZ789", &clock),
      Err(AccountError::InvalidVerificationCode(CodeRejection::Mismatch))
    );
    // Case-sensitive comparison
    assert_eq!(
      code.verify("abc123", &clock),
      Err(AccountError::InvalidVerificationCode(CodeRejection::Mismatch))
    );

    // Failed attempts leave the state untouched
    code.verify("ABC123", &clock).unwrap();
  }

  #[test]
  fn test_restore_validates_code_format() {
    let state = VerificationState::Verified {
      verified_at_utc: Utc::now(),
    };

    assert!(matches!(
      VerificationCode::restore("", state),
      Err(AccountError::InvalidVerificationCode(
        CodeRejection::WrongLength { .. }
      ))
    ));
    assert!(matches!(
      VerificationCode::restore("abc-12", state),
      Err(AccountError::InvalidVerificationCode(
        CodeRejection::Malformed
      ))
    ));

    let restored = VerificationCode::restore("Q7W2E9", state).unwrap();
    assert_eq!(restored.to_string(), "Q7W2E9");
    assert!(restored.is_verified());
  }

  #[test]
  fn test_verified_instant_is_the_checked_instant() {
    let start = Utc::now();
    let clock = CountingClock::new(start);
    let mut code = VerificationCode::new(&clock);
    let presented = code.code().to_string();
    let reads_before = clock.reads();

    code.verify(&presented, &clock).unwrap();

    assert_eq!(clock.reads(), reads_before + 1);
    assert_eq!(
      code.verified_at_utc(),
      Some(start + Duration::seconds(reads_before))
    );
  }

  #[test]
  fn test_oversized_ttl_saturates() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::with_ttl(&clock, Duration::MAX);
    let presented = code.code().to_string();

    assert_eq!(code.expires_at_utc(), Some(DateTime::<Utc>::MAX_UTC));
    clock.advance(Duration::days(365 * 100));
    code.verify(&presented, &clock).unwrap();
  }

  #[test]
  fn test_debug_redacts_code() {
    let clock = FixedClock::now();
    let code = VerificationCode::restore(
      "ZQXJKW",
      VerificationState::Issued {
        expires_at_utc: clock.utc_now() + Duration::minutes(5),
      },
    )
    .unwrap();

    let debug = format!("{:?}", code);

    assert!(!debug.contains("ZQXJKW"));
    assert!(debug.contains("***"));
    assert!(debug.contains("Issued"));
  }

  /// Clock that advances one second on every read
  struct CountingClock {
    start: DateTime<Utc>,
    reads: AtomicI64,
  }

  impl CountingClock {
    fn new(start: DateTime<Utc>) -> Self {
      Self {
        start,
        reads: AtomicI64::new(0),
      }
    }

    fn reads(&self) -> i64 {
      self.reads.load(Ordering::SeqCst)
    }
  }

  impl Clock for CountingClock {
    fn utc_now(&self) -> DateTime<Utc> {
      let n = self.reads.fetch_add(1, Ordering::SeqCst);
      self.start + Duration::seconds(n)
    }
  }

  #[test]
  fn test_custom_ttl() {
    let clock = FixedClock::now();
    let mut code = VerificationCode::with_ttl(&clock, Duration::seconds(30));
    let presented = code.code().to_string();

    clock.advance(Duration::seconds(31));

    assert!(code.is_expired(&clock));
    assert!(code.verify(&presented, &clock).is_err());
  }
}
