
use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use anyhow::Result;
use crate::config::settings::{ClientConfig, LogFormat, LoggingConfig};


#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "TRACE",
            LogLevel::DEBUG => "DEBUG",
            LogLevel::INFO => "INFO",
            LogLevel::WARN => "WARN",
            LogLevel::ERROR => "ERROR",
        }
    }
}


pub fn run(client_config: &ClientConfig, arg_log_level: Option<LogLevel>) -> Result<()> {
    let logging_config = resolve_logging_config(client_config.logging.as_ref(), arg_log_level);
    init_logging(&logging_config);
    Ok(())
}

/// CLI level first, then the config file, then `info`.
fn resolve_logging_config(config: Option<&LoggingConfig>, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let base = config.cloned().unwrap_or_default();
    let level = arg_log_level
        .map(|level| level.as_str().to_lowercase())
        .unwrap_or(base.level);
    LoggingConfig::new(level, base.format)
}


/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true) // flattens fields, good for CRI log parsers
                .with_ansi(false); // CRI parsers dislike ANSI color codes

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{resolve_logging_config, LogLevel};
    use crate::config::settings::{LogFormat, LoggingConfig};

    #[test]
    fn test_level_precedence() {
        let file = LoggingConfig::new("warn".to_owned(), LogFormat::Json);

        let resolved = resolve_logging_config(Some(&file), Some(LogLevel::DEBUG));
        assert_eq!(resolved.level, "debug");
        assert_eq!(resolved.format, LogFormat::Json);

        assert_eq!(resolve_logging_config(Some(&file), None).level, "warn");
        assert_eq!(resolve_logging_config(None, None).level, "info");
    }
}
