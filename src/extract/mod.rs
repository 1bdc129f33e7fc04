// src/extract/mod.rs

use anyhow::{Context, Result};
use lopdf::Document;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Five whitespace-separated runs of digits, as printed on the sample invoices.
pub const PLAIN_DIGITABLE_LINE: &str = r"\d+\s\d+\s\d+\s\d+\s\d+";

/// Brazilian boleto layout: `#####.##### #####.###### #####.###### # ##############`.
pub const BOLETO_DIGITABLE_LINE: &str =
    r"\d{5}\.\d{5}\s\d{5}\.\d{6}\s\d{5}\.\d{6}\s\d\s\d{14}";

/// Reads downloaded invoices and pulls the digitable line out of their text.
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    pdf_dir: PathBuf,
    pattern: Regex,
}

impl CodeExtractor {
    pub fn new(pdf_dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let pdf_dir = pdf_dir.into();
        let pattern = Regex::new(pattern)
            .with_context(|| format!("compiling digitable line pattern {:?}", pattern))?;
        info!(dir = %pdf_dir.display(), pattern = %pattern, "code extractor ready");
        Ok(Self { pdf_dir, pattern })
    }

    /// Digitable line of `pdf_dir/filename`, or `None` when the file cannot be
    /// read or holds no match.
    pub fn extract(&self, filename: &str) -> Option<String> {
        let path = self.pdf_dir.join(filename);
        let text = match pdf_text(&path) {
            Ok(text) => text,
            Err(e) => {
                error!(file = filename, error = %format!("{e:#}"), "could not read invoice");
                return None;
            }
        };

        match self.find_digitable_line(&text) {
            Some(line) => {
                info!(file = filename, "digitable line found");
                Some(line)
            }
            None => {
                warn!(file = filename, "no digitable line in invoice");
                None
            }
        }
    }

    /// First match of the pattern in `text`.
    pub fn find_digitable_line(&self, text: &str) -> Option<String> {
        self.pattern.find(text).map(|m| m.as_str().to_string())
    }
}

/// Text of every page of the PDF at `path`, concatenated in page order.
pub fn pdf_text(path: &Path) -> Result<String> {
    let doc = Document::load(path).with_context(|| format!("loading PDF {:?}", path))?;

    let mut text = String::new();
    // get_pages is keyed by 1-based page number, so iteration is in page order
    for page in doc.get_pages().into_keys() {
        let page_text = doc
            .extract_text(&[page])
            .with_context(|| format!("extracting text of page {} of {:?}", page, path))?;
        text.push_str(&page_text);
    }
    debug!(file = %path.display(), chars = text.len(), "pdf text extracted");
    Ok(text)
}
