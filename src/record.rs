// src/record.rs

use serde::Serialize;

/// One row of the debts table, plus the digitable line read from its invoice.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    pub description: String,
    pub fiscal_year: i32,
    pub installment: String,
    /// Kept as shown on the page, e.g. `"10/03/2024"`.
    pub due_date: String,
    pub amount: Option<f64>,
    pub status: String,
    /// Relative link to the invoice PDF, as found in the table.
    pub invoice_url: Option<String>,
    pub digitable_line: Option<String>,
}

impl DebtRecord {
    /// Name the downloaded invoice is stored under: the final segment of `invoice_url`.
    pub fn invoice_filename(&self) -> Option<&str> {
        self.invoice_url.as_deref().and_then(invoice_filename)
    }
}

/// Final path segment of a (possibly relative) URL, ignoring any query or fragment.
pub fn invoice_filename(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
