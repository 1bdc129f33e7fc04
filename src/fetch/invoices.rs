// src/fetch/invoices.rs

use anyhow::{Context, Result};
use futures::{stream::FuturesUnordered, StreamExt};
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{fs, time::Instant};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{config::Config, record::DebtRecord};

/// What happened to one batch. Only used for logging; failures never abort a batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DownloadReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<String>,
    /// Records that had no invoice link.
    pub skipped: usize,
}

/// Downloads every invoice of a batch at once and waits for all of them.
#[derive(Debug, Clone)]
pub struct BatchDownloader {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl BatchDownloader {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.download_timeout,
        }
    }

    /// Fetch the invoice of every record that has one into `dest_dir`.
    ///
    /// All downloads run concurrently; this returns once each has either
    /// been written or failed. Only failing to create `dest_dir` is an error.
    pub async fn download_all(
        &self,
        records: &[DebtRecord],
        dest_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let dest_dir = dest_dir.as_ref();
        fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("creating download directory {:?}", dest_dir))?;
        info!(dir = %dest_dir.display(), "downloading invoices");

        let mut report = DownloadReport::default();
        let mut tasks = FuturesUnordered::new();

        for record in records {
            let (Some(rel), Some(name)) = (record.invoice_url.as_deref(), record.invoice_filename())
            else {
                warn!(description = %record.description, "no invoice link; skipping");
                report.skipped += 1;
                continue;
            };

            let url = match self.base_url.join(rel) {
                Ok(url) => url,
                Err(e) => {
                    error!(link = rel, error = %e, "cannot resolve invoice link");
                    report.failed.push(rel.to_string());
                    continue;
                }
            };
            let dest = dest_dir.join(name);
            tasks.push(async move {
                let start = Instant::now();
                let res = download_invoice(&self.client, &url, &dest, self.timeout).await;
                (url, dest, start.elapsed(), res)
            });
        }

        while let Some((url, dest, elapsed, res)) = tasks.next().await {
            match res {
                Ok(bytes) => {
                    info!(file = %dest.display(), bytes, ?elapsed, "invoice downloaded");
                    report.saved.push(dest);
                }
                Err(e) => {
                    error!(%url, error = %format!("{e:#}"), "invoice download failed");
                    report.failed.push(url.to_string());
                }
            }
        }

        info!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            "download batch finished"
        );
        Ok(report)
    }
}

/// GET `url` and write the whole body to `dest`, replacing any existing file.
/// Returns the number of bytes written.
pub async fn download_invoice(
    client: &Client,
    url: &Url,
    dest: &Path,
    timeout: Duration,
) -> Result<usize> {
    let resp = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    debug!(file = %dest.display(), "writing invoice");
    fs::write(dest, &bytes)
        .await
        .with_context(|| format!("writing {:?}", dest))?;
    Ok(bytes.len())
}
