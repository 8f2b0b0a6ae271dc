use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use fs_err as fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::ProviderError;

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod retry;

/// One call to the text/vision model.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<PathBuf>,
    pub max_tokens: u32,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, req: &GenerationRequest) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider>;

/// Build the provider once at startup; callers borrow it.
pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let inner: DynProvider = match cfg.provider {
        ProviderKind::OpenAI => Box::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            std::env::var("OPENAI_API_KEY").ok(),
            cfg.openai_url.clone(),
            timeout,
        )?),
        ProviderKind::Anthropic => Box::new(anthropic::Anthropic::new(
            cfg.model.clone(),
            std::env::var("ANTHROPIC_API_KEY").ok(),
            cfg.anthropic_url.clone(),
            timeout,
        )?),
        ProviderKind::Ollama => Box::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            timeout,
        )?),
    };
    let policy = retry::RetryPolicy::from_config(&cfg.retry);
    Ok(Box::new(retry::RetryingProvider::new(inner, policy)))
}

/// Image attachment as (mime type, base64 payload).
pub(crate) fn encode_image(path: &Path) -> Result<(String, String), ProviderError> {
    let attachment = |reason: String| ProviderError::Attachment { path: path.to_path_buf(), reason };
    let mime = image_mime(path).ok_or_else(|| attachment("unsupported image type".into()))?;
    let bytes = fs::read(path).map_err(|e| attachment(e.to_string()))?;
    Ok((
        mime.to_string(),
        base64::engine::general_purpose::STANDARD.encode(bytes),
    ))
}

pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
