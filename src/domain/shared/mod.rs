pub mod extensions;
pub mod ports;

pub use extensions::StringExtensions;
pub use ports::Clock;
