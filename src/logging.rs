// src/logging.rs

use anyhow::{Context, Result};
use std::{fs, fs::File, path::Path, sync::Mutex};
use tracing_subscriber::{
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter,
};

/// Used when `RUST_LOG` is unset. HTTP internals only report warnings.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// `2024-03-10 14:02:33` in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the process-wide subscriber: one console layer and one layer
/// writing to `log_file`, which is truncated on every run.
///
/// Every line carries timestamp, level, target (the emitting module) and message.
pub fn init(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {:?}", parent))?;
    }
    let file =
        File::create(log_file).with_context(|| format!("creating log file {:?}", log_file))?;

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console = fmt::layer().with_timer(LocalTime).with_target(true);
    let to_file = fmt::layer()
        .with_timer(LocalTime)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env)
        .with(console)
        .with(to_file)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
