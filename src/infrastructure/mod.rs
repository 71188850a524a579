pub mod clock;
pub mod config;
pub mod security;
pub mod telemetry;
