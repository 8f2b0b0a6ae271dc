use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{encode_image, GenerationRequest, Provider};
use crate::errors::ProviderError;

const API_VERSION: &str = "2023-06-01";

pub struct Anthropic {
    model: String,
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl Anthropic {
    pub fn new(model: String, api_key: Option<String>, api_base: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            api_base,
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock<'a> {
    Image { source: ImageSource },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource {
    r#type: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        let mut content = Vec::new();
        if let Some(path) = &req.image {
            let (media_type, data) = encode_image(path)?;
            content.push(ContentBlock::Image {
                source: ImageSource { r#type: "base64", media_type, data },
            });
        }
        content.push(ContentBlock::Text { text: &req.prompt });

        let body = MsgRequest {
            model: &self.model,
            max_tokens: req.max_tokens,
            messages: vec![Msg { role: "user", content }],
        };

        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        tracing::debug!(%url, model = %self.model, image = req.image.is_some(), "anthropic request");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        tracing::trace!(%status, body = %text, "anthropic raw response");

        if !status.is_success() {
            return Err(ProviderError::Api { provider: "Anthropic", status, body: text }.into());
        }

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("anthropic response parse error: {}", e))?;

        let out: String = parsed
            .content
            .into_iter()
            .filter(|b| b.r#type == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");
        if out.trim().is_empty() {
            return Err(anyhow!("anthropic: empty content"));
        }
        Ok(out)
    }
}
