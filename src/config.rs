use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the diagnostic verbosity level.
pub const LOGGING_LEVEL_VAR: &str = "LOGGING_LEVEL";

/// Logging configuration resolved at process start. Verbosity only affects
/// diagnostic output, never control flow.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let level = std::env::var(LOGGING_LEVEL_VAR)
            .unwrap_or_else(|_| "info".to_owned())
            .to_lowercase();

        Self { level }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Initialize the global tracing subscriber from an explicit configuration.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_level_is_info() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_logging_level_is_lowercased() {
        std::env::set_var(LOGGING_LEVEL_VAR, "DEBUG");
        let config = LoggingConfig::from_env();
        assert_eq!(config.level, "debug");
        std::env::remove_var(LOGGING_LEVEL_VAR);
    }
}
