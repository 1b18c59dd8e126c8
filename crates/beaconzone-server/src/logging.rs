//! Tracing subscriber setup.
//!
//! [`LogMode::Production`] writes JSON records to a daily rolling file and a
//! plain compact stream to stdout for the service journal.
//! [`LogMode::Development`] prints pretty records with span open/close events.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "BEACONZONE_LOG_LEVEL";

/// Environment variable selecting the runtime environment.
pub const ENVIRONMENT_ENV: &str = "BEACONZONE_ENV";

const LOG_FILE_PREFIX: &str = "beaconzone";

static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Output style of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Rolling JSON file plus compact stdout.
    Production,
    /// Pretty stdout only.
    Development,
}

impl LogMode {
    /// Reads `BEACONZONE_ENV`; `production` or `prod` selects production.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENVIRONMENT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        let production = value.is_some_and(|env| {
            env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod")
        });
        if production {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `BEACONZONE_LOG_LEVEL`, which defaults to `info`.
///
/// # Errors
///
/// Returns an error if neither variable holds a valid filter directive.
pub fn init(mode: LogMode) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
            EnvFilter::try_new(level)?
        }
    };

    match mode {
        LogMode::Production => {
            let dir = log_directory();
            // A missing directory surfaces as a write error from the appender.
            let _ = std::fs::create_dir_all(&dir);

            let (file, file_guard) = tracing_appender::non_blocking(RollingFileAppender::new(
                Rotation::DAILY,
                &dir,
                LOG_FILE_PREFIX,
            ));
            let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(fmt::layer().compact().with_writer(stdout).with_ansi(false))
                .init();

            let _ = GUARDS.set(vec![file_guard, stdout_guard]);
        }
        LogMode::Development => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
                )
                .init();
        }
    }

    Ok(())
}

fn log_directory() -> PathBuf {
    if cfg!(target_os = "linux") {
        return PathBuf::from("/var/log").join(LOG_FILE_PREFIX);
    }
    directories::ProjectDirs::from("", "", LOG_FILE_PREFIX)
        .map_or_else(|| PathBuf::from("./logs"), |dirs| dirs.data_dir().join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(LogMode::parse(Some("production")), LogMode::Production);
        assert_eq!(LogMode::parse(Some("PROD")), LogMode::Production);
        assert_eq!(LogMode::parse(Some("staging")), LogMode::Development);
        assert_eq!(LogMode::parse(None), LogMode::Development);
    }

    #[test]
    fn test_log_directory_ends_with_crate_name() {
        let dir = log_directory();
        assert!(dir.iter().any(|part| part == LOG_FILE_PREFIX || part == "logs"));
    }
}
