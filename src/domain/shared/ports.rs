use chrono::{DateTime, Utc};

/// Source of the current UTC instant
///
/// Value objects never read the system clock themselves; every time-sensitive
/// operation receives a clock so tests can pin the instant.
pub trait Clock: Send + Sync {
  /// Returns the current instant in UTC
  fn utc_now(&self) -> DateTime<Utc>;
}
