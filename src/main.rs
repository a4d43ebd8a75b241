use anyhow::{bail, Context, Result};
use clap::Parser;
use psxscraper::{
    answer::{self, Answerer},
    config,
    fetch::{extract_tables, HttpRenderer, PageRenderer, RenderOptions},
    process::aggregate,
};
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Scrape the PSX market summary into one stock dataset and ask a model
/// about it.
#[derive(Parser, Debug)]
#[command(name = "psxscraper")]
struct Args {
    /// Question to ask about the scraped dataset
    #[arg(long, default_value = "tell the high and low volume stocks in psx")]
    question: String,

    /// Headless page rendering (honored by browser-backed renderers)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Seconds to let the page settle before the final snapshot
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(3..=30))]
    wait: u64,

    /// Market summary page to scrape
    #[arg(long, default_value = config::MARKET_SUMMARY_URL)]
    url: String,

    /// Directory for the aggregated workbook
    #[arg(long, default_value = config::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Workbook file name
    #[arg(long, default_value = config::DEFAULT_OUT_FILE)]
    out_file: String,

    /// Chat model to query
    #[arg(long, default_value = answer::DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) env + logging ────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    // ─── 2) credential gate, before any scraping ─────────────────────
    let api_key = config::api_key_from_env()?;

    // ─── 3) scrape the page into raw tables ──────────────────────────
    let url = Url::parse(&args.url).with_context(|| format!("parsing URL {}", args.url))?;
    info!(%url, wait = args.wait, headless = args.headless, "scraping PSX tables");

    let renderer = HttpRenderer::new()?;
    let opts = RenderOptions {
        headless: args.headless,
        wait: Duration::from_secs(args.wait),
        timeout: config::PAGE_LOAD_TIMEOUT,
    };
    let html = renderer.render(&url, &opts).await?;
    let tables = extract_tables(&html);
    info!(tables = tables.len(), "raw tables extracted");

    // ─── 4) normalize, concatenate, persist ──────────────────────────
    let dataset = match aggregate(&tables, &args.out_dir, &args.out_file)? {
        Some(dataset) if !dataset.rows.is_empty() => dataset,
        _ => bail!(
            "No stock tables detected after cleaning. \
             Try a longer --wait or --headless false."
        ),
    };

    println!(
        "Scraped rows: {} | cols: {}",
        dataset.rows.len(),
        dataset.columns.len()
    );
    println!();
    println!("{}", dataset.preview(30));

    // ─── 5) one question, one completion ─────────────────────────────
    info!(model = %args.model, "requesting answer");
    let answerer = Answerer::new(api_key, &args.model);
    let bot_answer = answerer.answer(&dataset, &args.question).await?;

    println!();
    println!("Bot Answer");
    println!("{}", bot_answer);

    Ok(())
}
