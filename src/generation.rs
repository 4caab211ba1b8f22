//! Answer generation from a question and its retrieved context.
//!
//! [`Generator`] is the seam the retriever calls; [`ChatGenerator`] is the
//! bundled implementation for any OpenAI-compatible chat-completions
//! endpoint (Groq by default). The answer is returned as one complete string.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;

use crate::config::LlmConfig;

const SYSTEM_PROMPT: &str = "You are a precise assistant that helps users understand their documents.\n\
1. Answer using only the information in the provided context.\n\
2. If the context only partly answers the question, give what it supports and say what is missing.\n\
3. Keep answers concise and focused on the question asked.\n\
4. If the question allows several readings, point out the ambiguity.\n\
5. Keep a professional, objective tone.";

/// Produces an answer for `query` grounded in `context`.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, query: &str, context: &str) -> Result<String>;
}

/// Render the user message sent alongside [`SYSTEM_PROMPT`].
pub fn user_prompt(query: &str, context: &str) -> String {
    format!(
        "Answer the following question using only the context below.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\n\
         Answer:",
        context, query
    )
}

/// Client for an OpenAI-compatible `POST {base_url}/chat/completions` API.
pub struct ChatGenerator {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl ChatGenerator {
    /// Build a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable named by
    /// `llm.api_key_env` is not set.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow!("{} environment variable not set", config.api_key_env))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn request_body(&self, query: &str, context: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(query, context)},
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "top_p": self.config.top_p,
            "stream": false,
        })
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn generate(&self, query: &str, context: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(query, context))
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("chat completion error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content` from a chat-completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid chat response: missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_embeds_context_and_question() {
        let prompt = user_prompt("Who is the CEO?", "The CEO is Ada.\n\nFounded 1999.");
        assert!(prompt.contains("Context:\nThe CEO is Ada.\n\nFounded 1999."));
        assert!(prompt.contains("Question: Who is the CEO?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn parses_first_choice() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Ada."}}]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Ada.");
    }

    #[test]
    fn missing_content_is_an_error() {
        let json = serde_json::json!({"choices": []});
        assert!(parse_chat_response(&json).is_err());
    }

    #[test]
    fn missing_api_key_fails_construction() {
        let config = LlmConfig {
            api_key_env: "DOCQA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        let err = ChatGenerator::new(&config).err().unwrap();
        assert!(err.to_string().contains("DOCQA_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
