use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used, for example
/// `"account_core=debug"`. Returns false when a subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
    .with(tracing_subscriber::fmt::layer())
    .try_init()
    .is_ok()
}
