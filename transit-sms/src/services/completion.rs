//! AI completion over an OpenAI-compatible chat endpoint.
//!
//! Three uses: a free-form answer that must fit the reply budget, a strict
//! yes/no answer, and a translation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{DEFAULT_MAX_CONCURRENT, LimitedClient, USER_AGENT};

use super::error::ServiceError;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// Completions are slower than the other providers.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const YES_NO_PROMPT: &str = "Reply ONLY with 'Ja' or 'Nee'. Nothing else.";

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Bearer token
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ServiceError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or(ServiceError::EmptyCompletion)
    }
}

/// Chat completion client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: LimitedClient,
    url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, ServiceError> {
        let bearer = format!("Bearer {}", config.api_key);
        let http = LimitedClient::new(
            &[
                ("authorization", bearer.as_str()),
                ("accept", "application/json"),
                ("user-agent", USER_AGENT),
            ],
            config.timeout_secs,
            config.max_concurrent,
        )?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model,
        })
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            stream: false,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let response: ChatResponse = self.http.post_json(&self.url, &request).await?;
        let text = response.into_text()?;
        debug!(chars = text.chars().count(), "Completion");
        Ok(text)
    }

    /// A direct answer to `prompt` in at most `max_chars` characters.
    pub async fn complete(&self, prompt: &str, max_chars: usize) -> Result<String, ServiceError> {
        info!(prompt, max_chars, "Completion request");
        self.chat(&budget_prompt(max_chars), prompt).await
    }

    /// `true` for yes.
    pub async fn yes_no(&self, question: &str) -> Result<bool, ServiceError> {
        info!(question, "Yes/no request");
        let raw = self.chat(YES_NO_PROMPT, question).await?;
        Ok(is_yes(&raw))
    }

    /// Translate `text` into the language with code `lang`, rendered as
    /// `text → translation`.
    pub async fn translate(&self, lang: &str, text: &str) -> Result<String, ServiceError> {
        info!(lang, text, "Translation request");
        let system = format!(
            "Translate to {}. Return ONLY the translation.",
            language_name(lang)
        );
        let translation = self.chat(&system, text).await?;
        Ok(format!("{text} \u{2192} {translation}"))
    }
}

fn budget_prompt(max_chars: usize) -> String {
    format!(
        "U bent de assistent van een inwoner van België. \
         Uw volledige antwoord wordt als sms bezorgd aan de verzoeker. \
         Het antwoord mag maximaal {max_chars} tekens lang zijn (inclusief spaties). \
         Herhaal de vraag niet, antwoord direct, bondig en correct. \
         Vermeld de tekenlimiet niet."
    )
}

/// Whether a model reply means yes.
pub fn is_yes(raw: &str) -> bool {
    let answer = raw
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();
    matches!(answer.as_str(), "ja" | "yes" | "true" | "1" | "j")
}

/// English name for a language code; unknown codes pass through.
pub fn language_name(code: &str) -> &str {
    match code.to_lowercase().as_str() {
        "en" => "English",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "nl" => "Dutch",
        "it" => "Italian",
        "pt" => "Portuguese",
        "pl" => "Polish",
        "tr" => "Turkish",
        "ar" => "Arabic",
        "zh" => "Chinese",
        "ru" => "Russian",
        _ => code,
    }
}
