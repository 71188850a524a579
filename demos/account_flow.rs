//! Walks through registration, confirmation and password aging
//!
//! Run with: cargo run --example account_flow
//!
//! To override configuration with environment variables:
//! ```bash
//! ACCOUNT_SECURITY__PASSWORD_MAX_AGE_SECONDS=60 \
//! RUST_LOG=account_core=debug \
//! cargo run --example account_flow
//! ```

use account_core::infrastructure::{
  clock::FixedClock, config::Config, security::Argon2PasswordHasher, telemetry,
};
use account_core::{Clock, Email, Password};
use chrono::Duration;

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  telemetry::init_tracing("account_core=debug");

  let config = Config::load()?;
  let policy = config.security.password_policy()?;
  let hasher = Argon2PasswordHasher::from_config(&config.hashing)?;
  let clock = FixedClock::now();

  let mut email = Email::with_verification_ttl(
    "Demo.User@Example.com",
    &clock,
    config.security.verification_code_ttl()?,
  )?;
  println!("Email: {} (hash {})", email, email.hash());

  let plaintext = Password::generate_with_policy(&policy);
  let password = Password::with_policy(&plaintext, policy, &hasher, &clock)?;
  println!("Password hash: {}", password);

  let code = email
    .verification_code()
    .map(|code| code.code().to_string())
    .unwrap_or_default();

  clock.advance(Duration::minutes(1));
  email.verify(&code, &clock)?;
  println!("Email verified at {}", clock.utc_now());

  clock.advance(policy.max_age());
  match password.verify(&clock) {
    Ok(()) => println!("Password still valid"),
    Err(e) => println!("After {} hours: {}", policy.max_age().num_hours(), e),
  }

  Ok(())
}
