use chrono::Duration;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::domain::account::password::PasswordPolicy;

/// Upper bound for configured windows: 100 years
const MAX_WINDOW_SECONDS: i64 = 100 * 365 * 86_400;

// Default value functions
fn default_password_min_length() -> usize {
  PasswordPolicy::DEFAULT_MIN_LENGTH
}

fn default_password_max_length() -> usize {
  PasswordPolicy::DEFAULT_MAX_LENGTH
}

fn default_password_max_age_seconds() -> i64 {
  86_400
}

fn default_verification_code_ttl_seconds() -> i64 {
  300
}

fn default_memory_cost_kib() -> u32 {
  19_456
}

fn default_time_cost() -> u32 {
  2
}

fn default_parallelism() -> u32 {
  1
}

/// Main library configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub security: SecurityConfig,
  #[serde(default)]
  pub hashing: HashingConfig,
}

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
  #[serde(default = "default_password_min_length")]
  pub password_min_length: usize,
  #[serde(default = "default_password_max_length")]
  pub password_max_length: usize,
  #[serde(default = "default_password_max_age_seconds")]
  pub password_max_age_seconds: i64,
  #[serde(default = "default_verification_code_ttl_seconds")]
  pub verification_code_ttl_seconds: i64,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
  #[serde(default = "default_memory_cost_kib")]
  pub memory_cost_kib: u32,
  #[serde(default = "default_time_cost")]
  pub time_cost: u32,
  #[serde(default = "default_parallelism")]
  pub parallelism: u32,
}

impl Default for HashingConfig {
  fn default() -> Self {
    Self {
      memory_cost_kib: default_memory_cost_kib(),
      time_cost: default_time_cost(),
      parallelism: default_parallelism(),
    }
  }
}

impl SecurityConfig {
  /// Builds the password policy used by `Password::with_policy`
  pub fn password_policy(&self) -> Result<PasswordPolicy, ConfigError> {
    let max_age = seconds_to_duration(
      "security.password_max_age_seconds",
      self.password_max_age_seconds,
    )?;

    PasswordPolicy::new(self.password_min_length, self.password_max_length, max_age)
      .map_err(|e| ConfigError::Message(e.to_string()))
  }

  /// Lifetime of freshly issued verification codes
  pub fn verification_code_ttl(&self) -> Result<Duration, ConfigError> {
    seconds_to_duration(
      "security.verification_code_ttl_seconds",
      self.verification_code_ttl_seconds,
    )
  }
}

// Positive and small enough to be added to any reasonable instant
fn seconds_to_duration(key: &str, seconds: i64) -> Result<Duration, ConfigError> {
  if seconds <= 0 || seconds > MAX_WINDOW_SECONDS {
    return Err(ConfigError::Message(format!(
      "{} must be between 1 and {} seconds, got {}",
      key, MAX_WINDOW_SECONDS, seconds
    )));
  }

  Duration::try_seconds(seconds)
    .ok_or_else(|| ConfigError::Message(format!("{} is out of range", key)))
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with ACCOUNT_ prefix
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the ACCOUNT_ prefix and are separated by double underscores:
  /// - `ACCOUNT_SECURITY__PASSWORD_MIN_LENGTH=8`
  /// - `ACCOUNT_SECURITY__PASSWORD_MAX_LENGTH=32`
  /// - `ACCOUNT_SECURITY__PASSWORD_MAX_AGE_SECONDS=86400`
  /// - `ACCOUNT_SECURITY__VERIFICATION_CODE_TTL_SECONDS=300`
  /// - `ACCOUNT_HASHING__MEMORY_COST_KIB=19456`
  ///
  /// # Errors
  ///
  /// Returns a `ConfigError` if:
  /// - config/default.toml is missing
  /// - Configuration files contain invalid TOML
  /// - Configuration values have invalid types
  /// - The password policy or verification window is out of range
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(true))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Use double underscore as separator: ACCOUNT_SECURITY__PASSWORD_MIN_LENGTH=10
      .add_source(
        Environment::with_prefix("ACCOUNT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    let config: Self = config.try_deserialize()?;
    config.validate()?;

    Ok(config)
  }

  /// Checks the values that deserialization alone cannot
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.security.password_policy()?;
    self.security.verification_code_ttl()?;

    Ok(())
  }
}
