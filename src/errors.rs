use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required field: {0}")] MissingField(&'static str),
    #[error("swipe csv error: {0}")] Csv(String),
    #[error("config error: {0}")] Config(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} env var is not set")] MissingApiKey(&'static str),
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("cannot attach image {path}: {reason}")]
    Attachment { path: PathBuf, reason: String },
}

impl ProviderError {
    /// Only server-side failures, timeouts and rate limiting can pass on a
    /// later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || *status == StatusCode::REQUEST_TIMEOUT
            }
            ProviderError::MissingApiKey(_) | ProviderError::Attachment { .. } => false,
        }
    }
}
