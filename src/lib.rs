//! Account identity core
//!
//! Email, password and verification code value objects with their
//! construction-time validation, hashing and time-bound state transitions.
//! Time always comes from an injected [`domain::Clock`].

pub mod domain;
pub mod infrastructure;

pub use domain::{
  AccountError, Clock, CodeRejection, Email, Password, PasswordHasher, PasswordPolicy,
  PasswordRejection, VerificationCode, VerificationState,
};
