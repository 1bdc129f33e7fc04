use anyhow::Result;
use debtscraper::{
    config::Config,
    logging,
    pipeline::{self, RunOutcome},
};
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) config + logging ─────────────────────────────────────────
    let config = Config::from_env()?;
    logging::init(&config.log_file)?;
    info!(target_url = %config.target_url, "startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) run ──────────────────────────────────────────────────────
    let start = Instant::now();
    match pipeline::run(&config).await? {
        RunOutcome::NoRecords => info!(elapsed = ?start.elapsed(), "nothing to do"),
        RunOutcome::Completed { records, persisted } => {
            let with_line = records.iter().filter(|r| r.digitable_line.is_some()).count();
            info!(
                records = records.len(),
                with_line,
                persisted,
                elapsed = ?start.elapsed(),
                "all done"
            );
        }
    }
    Ok(())
}
