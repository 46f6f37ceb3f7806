//! Text-generation client
//!
//! Talks to either an OpenAI-compatible chat-completions endpoint or a local
//! Ollama `/api/chat` endpoint. One request per call, fixed timeout, no retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ENV_LLM_PROVIDER: &str = "ADPULSE_LLM_PROVIDER";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "ADPULSE_OPENAI_MODEL";
pub const ENV_OPENAI_URL: &str = "ADPULSE_OPENAI_URL";
pub const ENV_OLLAMA_URL: &str = "OLLAMA_API_URL";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434/api/chat";
pub const DEFAULT_OLLAMA_MODEL: &str = "gpt-oss-20b";

/// Returned when the provider answers without any content
pub const NO_RESPONSE: &str = "No response generated.";

const SYSTEM_PROMPT: &str = "You are AdPulse, an elite performance marketing analyst.";
const TEMPERATURE: f32 = 0.3;
const USER_AGENT: &str = concat!("adpulse/", env!("CARGO_PKG_VERSION"));
const OPENAI_TIMEOUT: Duration = Duration::from_secs(60);
const OLLAMA_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    MissingCredential(String),

    #[error("Text generation request failed: {0}")]
    Network(String),

    #[error("Text generation API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected text generation response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

impl LlmProvider {
    /// "ollama" (any case) selects Ollama; anything else is OpenAI
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("ollama") {
            LlmProvider::Ollama
        } else {
            LlmProvider::OpenAi
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub openai_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub timeout: Duration,
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let provider = var(ENV_LLM_PROVIDER)
            .map(|p| LlmProvider::from_name(&p))
            .unwrap_or(LlmProvider::OpenAi);
        let timeout = match provider {
            LlmProvider::OpenAi => OPENAI_TIMEOUT,
            LlmProvider::Ollama => OLLAMA_TIMEOUT,
        };

        Self {
            provider,
            api_key: var(ENV_OPENAI_API_KEY),
            model: var(ENV_OPENAI_MODEL).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_url: var(ENV_OPENAI_URL).unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            ollama_url: var(ENV_OLLAMA_URL).unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: var(ENV_OLLAMA_MODEL).unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            timeout,
        }
    }
}

/// Anything that can turn a prompt into prose
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

fn chat_messages(prompt: &str) -> [ChatMessage<'_>; 2] {
    [
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        },
        ChatMessage {
            role: "user",
            content: prompt,
        },
    ]
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

/// Provider-backed generator
pub struct TextGenerator {
    http_client: reqwest::Client,
    settings: LlmSettings,
}

impl TextGenerator {
    /// Fails immediately when OpenAI is selected without an API key
    pub fn new(settings: LlmSettings) -> Result<Self, GenerationError> {
        if settings.provider == LlmProvider::OpenAi && settings.api_key.is_none() {
            return Err(GenerationError::MissingCredential(format!(
                "Missing {} environment variable. Set it before requesting AI insights or set {}=ollama.",
                ENV_OPENAI_API_KEY, ENV_LLM_PROVIDER
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.settings.provider
    }

    async fn generate_openai(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let request = OpenAiRequest {
            model: &self.settings.model,
            messages: chat_messages(prompt),
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .http_client
            .post(&self.settings.openai_url)
            .bearer_auth(self.settings.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    async fn generate_ollama(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = OllamaRequest {
            model: &self.settings.ollama_model,
            messages: chat_messages(prompt),
            stream: false,
        };

        let response = self
            .http_client
            .post(&self.settings.ollama_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        Ok(ollama_content(&data))
    }
}

#[async_trait]
impl TextGeneration for TextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        debug!(provider = ?self.settings.provider, prompt_len = prompt.len(), "Requesting completion");
        match self.settings.provider {
            LlmProvider::OpenAi => self.generate_openai(prompt, max_tokens).await,
            // Ollama's chat endpoint has no max_tokens field
            LlmProvider::Ollama => self.generate_ollama(prompt).await,
        }
    }
}

/// Pull the reply out of the shapes different Ollama versions return
fn ollama_content(data: &Value) -> String {
    let content_of = |message: &Value| {
        message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or(NO_RESPONSE)
            .to_string()
    };

    if let Some(message) = data.get("message") {
        return content_of(message);
    }
    if let Some(last) = data
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.last())
    {
        return content_of(last);
    }
    match data.get("response") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn settings(provider: LlmProvider, api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            provider,
            api_key: api_key.map(str::to_string),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_openai_without_key_fails_fast() {
        let err = TextGenerator::new(settings(LlmProvider::OpenAi, None))
            .err()
            .expect("missing key must fail");
        assert!(matches!(err, GenerationError::MissingCredential(_)));
        assert!(err.to_string().contains(ENV_OPENAI_API_KEY));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let generator = TextGenerator::new(settings(LlmProvider::Ollama, None)).unwrap();
        assert_eq!(generator.provider(), LlmProvider::Ollama);
    }

    #[test]
    fn test_provider_name_parsing() {
        assert_eq!(LlmProvider::from_name("Ollama"), LlmProvider::Ollama);
        assert_eq!(LlmProvider::from_name("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_name("anthropic"), LlmProvider::OpenAi);
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        std::env::set_var(ENV_LLM_PROVIDER, "ollama");
        std::env::set_var(ENV_OLLAMA_MODEL, "llama3");
        std::env::remove_var(ENV_OLLAMA_URL);

        let settings = LlmSettings::from_env();
        assert_eq!(settings.provider, LlmProvider::Ollama);
        assert_eq!(settings.ollama_model, "llama3");
        assert_eq!(settings.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(settings.timeout, OLLAMA_TIMEOUT);

        std::env::remove_var(ENV_LLM_PROVIDER);
        std::env::remove_var(ENV_OLLAMA_MODEL);
    }

    #[test]
    fn test_ollama_content_shapes() {
        assert_eq!(ollama_content(&json!({"message": {"content": "hi"}})), "hi");
        assert_eq!(ollama_content(&json!({"message": {}})), NO_RESPONSE);
        assert_eq!(
            ollama_content(&json!({"messages": [{"content": "a"}, {"content": "b"}]})),
            "b"
        );
        assert_eq!(ollama_content(&json!({"response": "plain"})), "plain");
        assert_eq!(ollama_content(&json!({"other": 1})), r#"{"other":1}"#);
    }
}
