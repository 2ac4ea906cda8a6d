//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - Console output (pretty in development, JSON in production)
//! - Daily rotating application log files under `<work_dir>/logs/app`

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging (tests, local tooling).
pub fn init_logger(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Initialize logging with an optional daily rotating file appender.
///
/// Returns the appender guard; dropping it flushes and stops the writer,
/// so the caller must hold it for the process lifetime.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let mut guard = None;
    let file_layer = match log_dir {
        Some(dir) => {
            let app_log_dir = Path::new(dir).join("app");
            fs::create_dir_all(&app_log_dir)?;

            let appender = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);

            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// Delete application log files older than `max_age_days`.
pub fn cleanup_old_logs(log_dir: &Path, max_age_days: i64) -> anyhow::Result<()> {
    use chrono::NaiveDate;

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(max_age_days);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // Rolling appender names files app.YYYY-MM-DD
        if let Some(date_part) = name.strip_prefix("app.")
            && let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_only_stale_log_files() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&app_dir).unwrap();

        let today = chrono::Utc::now().date_naive();
        let fresh = app_dir.join(format!("app.{}", today.format("%Y-%m-%d")));
        let stale = app_dir.join("app.2000-01-01");
        let unrelated = app_dir.join("notes.txt");
        fs::write(&fresh, "").unwrap();
        fs::write(&stale, "").unwrap();
        fs::write(&unrelated, "").unwrap();

        cleanup_old_logs(dir.path(), 7).unwrap();

        assert!(fresh.exists());
        assert!(!stale.exists());
        assert!(unrelated.exists());
    }
}
