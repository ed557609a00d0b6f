//! Text-generation providers.

use crate::error::ProviderError;
use crate::{AiProvider, AiTurn};
use async_trait::async_trait;
use std::time::Duration;

/// Timeout for one chat completion call.
const AI_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible chat completion provider.
///
/// Works with any API that follows the OpenAI chat completion format by
/// changing `base_url` — OpenAI, Groq, Mistral, OpenRouter, local
/// inference servers. The continuity token is forwarded as the request's
/// `user` field so the upstream can correlate turns; nothing is stored
/// gateway-side.
pub struct ChatCompletionsAi {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ChatCompletionsAi {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl AiProvider for ChatCompletionsAi {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, turn: &AiTurn<'_>) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "{} API key is empty",
                self.name
            )));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": turn.system_prompt },
                { "role": "user", "content": turn.user_text },
            ],
            "user": turn.chat_id,
        });

        tracing::debug!(
            provider = %self.name,
            model = %self.model,
            chars = turn.user_text.len(),
            "sending chat completion request"
        );

        let send = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = tokio::time::timeout(AI_TIMEOUT, send)
            .await
            .map_err(|_| ProviderError::Timeout(AI_TIMEOUT.as_secs()))?
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing choices[0].message.content".to_string())
            })
    }
}
