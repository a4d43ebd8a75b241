// src/config.rs

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

/// The one page this pipeline scrapes.
pub const MARKET_SUMMARY_URL: &str = "https://www.psx.com.pk/market-summary/#main";

pub const DEFAULT_OUT_DIR: &str = "psx_output";
pub const DEFAULT_OUT_FILE: &str = "psx_stocks_single_sheet.xlsx";

/// Hard ceiling on a single page fetch.
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Read the OpenAI credential from the environment (`.env` is loaded by main).
/// Absence is a hard stop before any scraping happens.
pub fn api_key_from_env() -> Result<String> {
    env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow!("OPENAI_API_KEY not found. Put it in .env or set it in your environment."))
}
