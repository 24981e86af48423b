use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs a console layer and a daily rolling file layer under `log_dir`.
/// `RUST_LOG` takes precedence over `base_level`.
pub fn setup_logging(base_level: &str, log_dir: &Path, file_prefix: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .with_context(|| format!("Invalid log filter: {}", base_level))?;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create logs directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)
        .context("Failed to create log file appender")?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    if LOG_GUARD.set(guard).is_err() {
        anyhow::bail!("Logging already initialized");
    }

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logger initialization failed")?;

    Ok(())
}
