// Logging setup
//
// Console-only tracing subscriber. The filter comes from RUST_LOG, then
// LOG_LEVEL, then the caller's default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `idgen_core=debug`
    pub log_filter: Option<String>,
    /// Include the module target in each line
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Read `RUST_LOG` / `LOG_LEVEL`
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok())
                .filter(|s| !s.is_empty()),
            ..Default::default()
        }
    }

    fn filter(&self, default_filter: &str) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(default_filter))
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// machine-readable. Calling it twice is a no-op.
pub fn init_logging(config: LogConfig, default_filter: &str) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_filter(config.filter(default_filter));

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
