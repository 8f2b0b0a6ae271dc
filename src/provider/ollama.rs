use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{encode_image, GenerationRequest, Provider};
use crate::errors::ProviderError;

pub struct Ollama {
    model: String,
    url: String,
    client: Client,
}

impl Ollama {
    pub fn new(model: String, url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            model,
            url,
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<String> {
        let mut images = Vec::new();
        if let Some(path) = &req.image {
            images.push(encode_image(path)?.1);
        }

        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: &req.prompt, images }],
            stream: false,
            options: OllamaOptions { num_predict: req.max_tokens },
        };
        tracing::debug!(%url, model = %self.model, image = req.image.is_some(), "ollama request");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;
        tracing::trace!(%status, body = %text, "ollama raw response");

        if !status.is_success() {
            return Err(ProviderError::Api { provider: "Ollama", status, body: text }.into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("ollama response parse error: {}", e))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn sends_non_streaming_chat_with_image() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("ref.png");
        std::fs::write(&img, b"abc").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "llava",
                "stream": false,
                "options": { "num_predict": 16 },
                "messages": [{ "role": "user", "content": "p", "images": ["YWJj"] }]
            })))
            .with_status(200)
            .with_body(r#"{"message":{"role":"assistant","content":"brief"},"done":true}"#)
            .create_async()
            .await;

        let p = Ollama::new("llava".into(), server.url(), Duration::from_secs(5)).unwrap();
        let req = GenerationRequest { prompt: "p".into(), image: Some(img), max_tokens: 16 };
        assert_eq!(p.generate(&req).await.unwrap(), "brief");
        mock.assert_async().await;
    }
}
