pub mod account;
pub mod shared;

// Re-export account module for easier access
pub use account::*;
pub use shared::{Clock, StringExtensions};
