// src/pipeline.rs

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::{error, info};

use crate::{
    config::Config,
    extract::CodeExtractor,
    fetch::{http_client, BatchDownloader, TableCollector},
    record::DebtRecord,
};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The table fetch produced nothing; no download was attempted.
    NoRecords,
    Completed {
        records: Vec<DebtRecord>,
        /// `false` when the dataset could not be written.
        persisted: bool,
    },
}

/// Scrape the table, download the invoices, read their digitable lines and
/// write the dataset to `config.output_path`.
pub async fn run(config: &Config) -> Result<RunOutcome> {
    let client = http_client()?;
    let extractor = CodeExtractor::new(&config.pdf_dir, &config.digitable_pattern)?;

    // ─── 1) table ────────────────────────────────────────────────────
    info!("[1/4] scraping debts table");
    let mut records = TableCollector::new(client.clone(), config)
        .fetch(&config.target_url)
        .await;
    if records.is_empty() {
        error!("no records extracted; stopping");
        return Ok(RunOutcome::NoRecords);
    }
    info!(count = records.len(), "records extracted");

    // ─── 2) invoices ─────────────────────────────────────────────────
    info!("[2/4] downloading invoices");
    BatchDownloader::new(client, config)
        .download_all(&records, &config.pdf_dir)
        .await?;

    // ─── 3) digitable lines ──────────────────────────────────────────
    info!("[3/4] extracting digitable lines");
    fill_digitable_lines(&mut records, &extractor);

    // ─── 4) persist ──────────────────────────────────────────────────
    info!("[4/4] saving dataset");
    let persisted = match write_dataset(&config.output_path, &records) {
        Ok(()) => {
            info!(path = %config.output_path.display(), "dataset saved");
            true
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "could not save dataset");
            false
        }
    };

    info!("run finished");
    Ok(RunOutcome::Completed { records, persisted })
}

/// Set `digitable_line` on every record; records without an invoice get `None`.
pub fn fill_digitable_lines(records: &mut [DebtRecord], extractor: &CodeExtractor) {
    for record in records.iter_mut() {
        record.digitable_line = record
            .invoice_filename()
            .and_then(|name| extractor.extract(name));
    }
}

/// Pretty-printed JSON array, UTF-8 with non-ASCII left as is.
pub fn write_dataset(path: &Path, records: &[DebtRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(records).context("serializing dataset")?;
    fs::write(path, json).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}
