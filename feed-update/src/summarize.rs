use crate::config::SummarizerConfig;
use crate::types::{FeedError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rewrites upstream text with a language model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn summarizer_name(&self) -> String;

    /// Runs `pattern` (a prompt with an optional `%s` slot) over `text`.
    async fn summarize(&self, pattern: &str, text: &str) -> Result<String>;
}

/// Fills the `%s` slot of `pattern`, or appends the text when there is none.
pub fn build_prompt(pattern: &str, text: &str) -> String {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return text.to_string();
    }
    if pattern.contains("%s") {
        return pattern.replacen("%s", text, 1);
    }
    format!("{}{}", pattern, text)
}

/// Used when no model is configured. Always fails, so callers keep the raw
/// upstream text.
pub struct PassthroughSummarizer;

#[async_trait]
impl Summarizer for PassthroughSummarizer {
    fn summarizer_name(&self) -> String {
        "passthrough".to_string()
    }

    async fn summarize(&self, _pattern: &str, _text: &str) -> Result<String> {
        Err(FeedError::Summarizer("summarizer disabled".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Hugging Face router, OpenAI style chat completions.
pub struct HuggingFaceSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    token: String,
    temperature: f64,
}

impl HuggingFaceSummarizer {
    pub fn new(config: &SummarizerConfig, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            token,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    fn summarizer_name(&self) -> String {
        format!("huggingface ({})", self.model)
    }

    async fn summarize(&self, pattern: &str, text: &str) -> Result<String> {
        let prompt = build_prompt(pattern, text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        debug!("Requesting summary from {} ({} prompt bytes)", self.endpoint, prompt.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FeedError::Summarizer(format!(
                "huggingface api status: {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::Summarizer("huggingface api returned no choices".to_string()))?;
        let text = reply.message.content.trim().to_string();
        if text.is_empty() {
            return Err(FeedError::Summarizer("huggingface api returned an empty reply".to_string()));
        }
        Ok(text)
    }
}

/// Picks the summarizer named by `AI_PROVIDER`. Without a token the model is
/// unusable, so adapters fall back to raw content.
pub fn summarizer_from_config(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.provider.as_str() {
        "" | "huggingface" => match &config.token {
            Some(token) => {
                let summarizer = HuggingFaceSummarizer::new(config, token.clone())?;
                info!("Using summarizer: {}", summarizer.summarizer_name());
                Ok(Arc::new(summarizer))
            }
            None => {
                warn!("No HUGGINGFACE_TOKEN or HF_TOKEN set, summaries disabled");
                Ok(Arc::new(PassthroughSummarizer))
            }
        },
        other => Err(FeedError::Summarizer(format!("unknown ai provider: {}", other))),
    }
}
