// src/config.rs

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::{env, path::PathBuf, time::Duration};
use url::Url;

use crate::extract::{BOLETO_DIGITABLE_LINE, PLAIN_DIGITABLE_LINE};

pub const DEFAULT_TARGET_URL: &str = "https://arth-inacio.github.io/scod_scraping_challenge/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const ENV_PREFIX: &str = "DEBTSCRAPER_";

/// Runtime settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Page holding the debts table.
    pub target_url: Url,
    /// Relative invoice links are resolved against this.
    pub base_url: Url,
    pub pdf_dir: PathBuf,
    pub output_path: PathBuf,
    pub log_file: PathBuf,
    pub digitable_pattern: String,
    pub page_timeout: Duration,
    pub download_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        let target = Url::parse(DEFAULT_TARGET_URL).expect("default target URL is valid");
        Self {
            base_url: target.clone(),
            target_url: target,
            pdf_dir: PathBuf::from("boletos"),
            output_path: PathBuf::from("data/dados.json"),
            log_file: PathBuf::from("data/app.log"),
            digitable_pattern: PLAIN_DIGITABLE_LINE.to_string(),
            page_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `DEBTSCRAPER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `DEBTSCRAPER_*` key. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Config::default();

        if let Some(v) = get("TARGET_URL") {
            cfg.target_url = parse_url("TARGET_URL", &v)?;
        }
        if let Some(v) = get("BASE_URL") {
            cfg.base_url = parse_url("BASE_URL", &v)?;
        }
        if let Some(v) = get("PDF_DIR") {
            cfg.pdf_dir = PathBuf::from(v);
        }
        if let Some(v) = get("OUTPUT") {
            cfg.output_path = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_FILE") {
            cfg.log_file = PathBuf::from(v);
        }
        if let Some(v) = get("DIGITABLE_PATTERN") {
            cfg.digitable_pattern = match v.as_str() {
                "plain" => PLAIN_DIGITABLE_LINE.to_string(),
                "boleto" => BOLETO_DIGITABLE_LINE.to_string(),
                _ => v,
            };
        }
        if let Some(v) = get("PAGE_TIMEOUT_SECS") {
            cfg.page_timeout = parse_secs("PAGE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("DOWNLOAD_TIMEOUT_SECS") {
            cfg.download_timeout = parse_secs("DOWNLOAD_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("USER_AGENT") {
            cfg.user_agent = v;
        }

        Regex::new(&cfg.digitable_pattern).with_context(|| {
            format!(
                "{ENV_PREFIX}DIGITABLE_PATTERN is not a valid regex: {}",
                cfg.digitable_pattern
            )
        })?;

        Ok(cfg)
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).with_context(|| format!("{ENV_PREFIX}{name} is not a valid URL: {raw}"))
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("{ENV_PREFIX}{name} must be a whole number of seconds: {raw}"))?;
    if secs == 0 {
        bail!("{ENV_PREFIX}{name} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
