pub mod email;
pub mod errors;
pub mod password;
pub mod ports;
pub mod verification_code;

// Re-export commonly used types
pub use email::Email;
pub use errors::{AccountError, CodeRejection, PasswordRejection};
pub use password::{Password, PasswordPolicy};
pub use ports::PasswordHasher;
pub use verification_code::{VerificationCode, VerificationState};
