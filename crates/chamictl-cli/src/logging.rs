//! Logging setup.
//!
//! Logs go to stderr so stdout carries only command output.
//!
//! Configuration loading runs under a scoped subscriber built from the
//! command-line flags alone. The global subscriber, which also honors the
//! config file's `log` section, is installed once the config is known.

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::cli::{LogFormat, LogLevel};

/// Level used when neither config, flag nor `RUST_LOG` set one.
const DEFAULT_LEVEL: &str = "warn";

/// Effective logging settings after merging config and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Option<String>,
    pub format: String,
}

impl LogSettings {
    /// Flags win over config values.
    pub fn resolve(
        config_level: Option<&str>,
        config_format: Option<&str>,
        flag_level: Option<LogLevel>,
        flag_format: Option<LogFormat>,
    ) -> Self {
        let level = flag_level
            .map(|l| l.as_str().to_string())
            .or_else(|| config_level.map(str::to_string));
        let format = flag_format
            .map(|f| f.as_str().to_string())
            .or_else(|| config_format.map(str::to_string))
            .unwrap_or_else(|| LogFormat::Rfc3339.as_str().to_string());

        Self { level, format }
    }

    fn filter(&self) -> EnvFilter {
        match self.level.as_deref() {
            Some(level) => EnvFilter::new(directive(level)),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
        }
    }
}

/// Map a configured level name onto a filter directive for our crates.
/// Dependencies stay at warn.
fn directive(level: &str) -> String {
    let level = match level {
        "warning" => "warn",
        other => other,
    };
    format!("warn,chamictl={0},chamictl_core={0}", level)
}

/// Build a stderr subscriber for `settings`.
pub fn dispatch(settings: &LogSettings) -> Dispatch {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_writer(std::io::stderr);

    match settings.format.as_str() {
        "json" => Dispatch::new(builder.json().finish()),
        "basic" => Dispatch::new(builder.without_time().with_target(false).finish()),
        _ => Dispatch::new(builder.with_target(false).finish()),
    }
}

/// Install the global subscriber. Call once.
pub fn init(settings: &LogSettings) {
    if let Err(e) = tracing::dispatcher::set_global_default(dispatch(settings)) {
        eprintln!("failed to initialize logging: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let s = LogSettings::resolve(Some("info"), Some("json"), Some(LogLevel::Trace), None);
        assert_eq!(s.level.as_deref(), Some("trace"));
        assert_eq!(s.format, "json");

        let s = LogSettings::resolve(None, None, None, Some(LogFormat::Basic));
        assert_eq!(s.level, None);
        assert_eq!(s.format, "basic");

        let s = LogSettings::resolve(None, None, None, None);
        assert_eq!(s.format, "rfc3339");
    }

    #[test]
    fn test_flag_only_dispatch_enables_core_debug() {
        let early = LogSettings::resolve(None, None, Some(LogLevel::Debug), None);
        tracing::dispatcher::with_default(&dispatch(&early), || {
            assert!(tracing::enabled!(target: "chamictl_core::config::file", tracing::Level::DEBUG));
            assert!(!tracing::enabled!(target: "hyper::proto", tracing::Level::DEBUG));
        });

        let quiet = LogSettings::resolve(None, None, Some(LogLevel::Warning), None);
        tracing::dispatcher::with_default(&dispatch(&quiet), || {
            assert!(!tracing::enabled!(target: "chamictl_core::config::file", tracing::Level::DEBUG));
        });
    }

    #[test]
    fn test_directive() {
        assert_eq!(directive("warning"), "warn,chamictl=warn,chamictl_core=warn");
        assert_eq!(directive("debug"), "warn,chamictl=debug,chamictl_core=debug");
    }
}
