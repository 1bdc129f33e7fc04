// src/fetch/table.rs

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use reqwest::{header::USER_AGENT, Client};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{config::Config, record::DebtRecord};

/// Cells per data row: description, year, installment, due date, amount, status, invoice.
pub const COLUMN_COUNT: usize = 7;

static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("CSS selector for table rows is valid"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("CSS selector for cells is valid"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("CSS selector for links is valid"));

/// Fetches the debts page and turns its table into records.
#[derive(Debug, Clone)]
pub struct TableCollector {
    client: Client,
    user_agent: String,
    timeout: Duration,
}

impl TableCollector {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            timeout: config.page_timeout,
        }
    }

    /// GET `url` and parse every well-formed row.
    ///
    /// Network failures and non-2xx statuses are logged and yield an empty
    /// list; there are no retries.
    pub async fn fetch(&self, url: &Url) -> Vec<DebtRecord> {
        info!(%url, "fetching debts page");
        let html = match self.get_html(url).await {
            Ok(html) => html,
            Err(e) => {
                error!(%url, error = %format!("{e:#}"), "could not fetch debts page");
                return Vec::new();
            }
        };

        let records = parse_table(&html);
        info!(count = records.len(), "table scraped");
        records
    }

    async fn get_html(&self, url: &Url) -> Result<String> {
        self.client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }
}

/// Parse every `tbody tr` of `html`. Rows that do not have exactly
/// [`COLUMN_COUNT`] cells or whose year is not an integer are dropped.
pub fn parse_table(html: &str) -> Vec<DebtRecord> {
    let doc = Html::parse_document(html);
    let rows: Vec<ElementRef> = doc.select(&ROW).collect();
    debug!(rows = rows.len(), "table rows found");

    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match parse_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(row = idx + 1, error = %e, "skipping table row");
                None
            }
        })
        .collect()
}

fn parse_row(row: ElementRef) -> Result<DebtRecord> {
    let cells: Vec<ElementRef> = row.select(&CELL).collect();
    if cells.len() != COLUMN_COUNT {
        bail!("expected {} cells, found {}", COLUMN_COUNT, cells.len());
    }

    let year = cell_text(cells[1]);
    let fiscal_year = year
        .parse::<i32>()
        .with_context(|| format!("fiscal year {:?} is not an integer", year))?;

    let invoice_url = cells[6]
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    Ok(DebtRecord {
        description: cell_text(cells[0]),
        fiscal_year,
        installment: cell_text(cells[2]),
        due_date: cell_text(cells[3]),
        amount: parse_amount(Some(&cell_text(cells[4]))),
        status: cell_text(cells[5]),
        invoice_url,
        digitable_line: None,
    })
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// `"R$ 1.234,56"` → `1234.56`. Missing, malformed or non-finite input gives `None`.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?
        .replace("R$", "")
        .trim()
        .replace('.', "")
        .replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
