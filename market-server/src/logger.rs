//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` is applied to the
//! server and tower-http targets. With a log directory the output goes to
//! a daily rolling file instead of stdout.

use std::path::Path;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "market_server=info,tower_http=info";

/// Initialize the global subscriber
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        match file_appender(Path::new(dir)) {
            Some(appender) => {
                subscriber.with_ansi(false).with_writer(appender).init();
                return;
            }
            None => {
                subscriber.init();
                tracing::warn!(log_dir = %dir, "Log directory does not exist, logging to stdout");
                return;
            }
        }
    }

    subscriber.init();
}

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(log_level).into())
}

fn default_directives(log_level: Option<&str>) -> String {
    match log_level {
        Some(level) => format!("market_server={level},tower_http={level}"),
        None => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn file_appender(dir: &Path) -> Option<RollingFileAppender> {
    if !dir.is_dir() {
        return None;
    }
    Some(tracing_appender::rolling::daily(dir, "market-server"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_log_level() {
        assert_eq!(default_directives(None), DEFAULT_DIRECTIVES);
        assert_eq!(
            default_directives(Some("debug")),
            "market_server=debug,tower_http=debug"
        );
    }

    #[test]
    fn file_appender_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(file_appender(dir.path()).is_some());
        assert!(file_appender(&dir.path().join("missing")).is_none());
    }
}
