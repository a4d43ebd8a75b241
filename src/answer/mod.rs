// src/answer/mod.rs

pub mod types;

use crate::process::table::Dataset;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use tracing::debug;

pub use types::{ChatRequest, ChatResponse, Message};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "\
You are a PSX market analysis assistant. You will be given (1) a user question and (2) computed results extracted from PSX tabular data (columns like SCRIP, LDCP, OPEN, HIGH, LOW, CURRENT, CHANGE, VOLUME).

Rules:
- Use ONLY the provided computed results. Do not invent or assume any prices, volumes, ranks, symbols, sectors, dates, or trends.
- If the question requires data not present in the computed results, say exactly what is missing and what you can answer instead.
- Do NOT provide financial advice, buy/sell recommendations, or future predictions.
- Prefer short, clear explanations with bullet points.
- When citing numbers, repeat them exactly as provided.
Output format:
1) 1-2 line summary
2) Bullets with key observations
3) If needed: a short \"Data limitations\" note";

/// Build the two-message prompt: the fixed system instruction plus one user
/// turn holding the trimmed question and the full fixed-width table text.
pub fn messages_for(dataset: &Dataset, question: &str) -> Vec<Message> {
    let table_text = dataset.to_fixed_width_string();
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!("{}\n\n{}", question.trim(), table_text)),
    ]
}

/// Answers questions about one aggregated dataset with a single
/// non-streaming chat completion. No retry, no caching.
pub struct Answerer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl Answerer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Point at a different endpoint (proxies, Azure).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One request per invocation; the first choice's text comes back
    /// verbatim. Any failure is fatal for the invocation.
    pub async fn answer(&self, dataset: &Dataset, question: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model, messages_for(dataset, question));
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, rows = dataset.rows.len(), "requesting chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("chat completion failed with {}: {}", status, body);
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .context("decoding chat completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion returned no message content"))
    }
}
