//! Process-wide diagnostic log.
//!
//! `init` is called once at start-up. It installs a subscriber that appends
//! `timestamp level message` lines to a file through a background writer.
//! The returned guard must live until the process ends; dropping it flushes
//! whatever is still buffered.

use std::path::Path;

use eyre::{eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .ok_or_else(|| eyre!("log file path {} has no file name", log_file.display()))?;
    std::fs::create_dir_all(directory)?;

    // `never` opens the file in append mode and never rotates it.
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| eyre!("logging already initialised: {e}"))?;

    Ok(guard)
}
