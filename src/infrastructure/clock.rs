use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::domain::shared::ports::Clock;

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
  pub fn new() -> Self {
    Self
  }
}

impl Clock for SystemClock {
  fn utc_now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Clock pinned to a settable instant
///
/// Used by tests and by callers that replay stored events. Interior mutability
/// lets a shared `&FixedClock` be moved forward between operations.
#[derive(Debug)]
pub struct FixedClock {
  now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      now: RwLock::new(now),
    }
  }

  /// Pins the clock to the current system time
  pub fn now() -> Self {
    Self::new(Utc::now())
  }

  pub fn set(&self, now: DateTime<Utc>) {
    let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
    *guard = now;
  }

  pub fn advance(&self, by: Duration) {
    let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
    *guard += by;
  }
}

impl Clock for FixedClock {
  fn utc_now(&self) -> DateTime<Utc> {
    *self.now.read().unwrap_or_else(|e| e.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fixed_clock_returns_pinned_instant() {
    let instant = Utc::now();
    let clock = FixedClock::new(instant);

    assert_eq!(clock.utc_now(), instant);
    assert_eq!(clock.utc_now(), instant);
  }

  #[test]
  fn test_fixed_clock_advance_and_set() {
    let instant = Utc::now();
    let clock = FixedClock::new(instant);

    clock.advance(Duration::minutes(5));
    assert_eq!(clock.utc_now(), instant + Duration::minutes(5));

    clock.set(instant);
    assert_eq!(clock.utc_now(), instant);
  }

  #[test]
  fn test_system_clock_moves_forward() {
    let clock = SystemClock::new();
    let first = clock.utc_now();
    let second = clock.utc_now();

    assert!(second >= first);
  }
}
