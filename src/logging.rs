//! Tracing setup for the binary.
//!
//! The filter comes from `TASKFLOW_LOG` when set (including from `.env`),
//! otherwise `warn`, or `debug` with `--verbose`.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::storage::data_dir;

pub const LOG_ENV: &str = "TASKFLOW_LOG";

pub fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global subscriber. Call after `.env` has been loaded.
///
/// Logs go to stderr, except in the TUI where they would corrupt the screen
/// and are appended to `taskflow.log` in the data directory instead.
pub fn init(verbose: bool, to_file: bool) {
    let filter = env_filter(verbose);

    if to_file {
        let dir = data_dir();
        let file = std::fs::create_dir_all(&dir).and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("taskflow.log"))
        });
        if let Ok(file) = file {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use figment::Jail;

    #[test]
    fn level_from_dotenv_file() {
        Jail::expect_with(|jail| {
            std::env::remove_var(LOG_ENV);
            jail.create_file(".env", "TASKFLOW_LOG=taskflow=trace\n")?;

            Config::load_dotenv();
            let filter = env_filter(false).to_string();
            std::env::remove_var(LOG_ENV);

            assert_eq!(filter, "taskflow=trace");
            Ok(())
        });
    }

    #[test]
    fn verbose_flag_without_env() {
        Jail::expect_with(|_jail| {
            std::env::remove_var(LOG_ENV);
            assert_eq!(env_filter(true).to_string(), "debug");
            assert_eq!(env_filter(false).to_string(), "warn");
            Ok(())
        });
    }
}
