//! Bounded retry around a single model invocation.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use super::{DynProvider, GenerationRequest, Provider};
use crate::config::RetryConfig;
use crate::errors::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

pub struct RetryingProvider {
    inner: DynProvider,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: DynProvider, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<String> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.inner.generate(req).await {
                Ok(text) => return Ok(text),
                Err(error) => error,
            };
            let retryable = error
                .downcast_ref::<ProviderError>()
                .map_or(true, ProviderError::is_retryable);
            tracing::warn!(
                provider = self.inner.name(),
                attempt,
                max_attempts,
                retryable,
                error = %error,
                "generation failed"
            );

            if !retryable || attempt >= max_attempts {
                return Err(error.context(format!(
                    "{} failed after {} attempt(s)",
                    self.inner.name(),
                    attempt
                )));
            }
            if !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }
    }
}
