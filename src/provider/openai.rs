use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{encode_image, GenerationRequest, Provider};
use crate::errors::ProviderError;

/// Chat completions; an image rides along as a data URL content part.
pub struct OpenAIProvider {
    model: String,
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: Option<String>, api_base: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            api_base,
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("OPENAI_API_KEY"))?;

        let mut content = vec![json!({ "type": "text", "text": req.prompt })];
        if let Some(path) = &req.image {
            let (mime, data) = encode_image(path)?;
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime};base64,{data}") }
            }));
        }

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": req.max_tokens,
        });

        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        tracing::debug!(%url, model = %self.model, image = req.image.is_some(), "openai request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        tracing::trace!(%status, body = %text, "openai raw response");

        if !status.is_success() {
            return Err(ProviderError::Api { provider: "OpenAI", status, body: text }.into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("OpenAI returned no text"))
    }
}
