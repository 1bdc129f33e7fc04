// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;

pub mod invoices;
pub mod table;

pub use invoices::{BatchDownloader, DownloadReport};
pub use table::{parse_amount, parse_table, TableCollector};

/// Shared HTTP client for the page fetch and every invoice download.
/// Timeouts are set per request, not here.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .gzip(true)
        .build()
        .context("building HTTP client")
}
