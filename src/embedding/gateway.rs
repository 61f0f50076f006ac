//! Embedding gateway: bounded retry with exponential backoff, and per-item
//! fallback for partially failing batches.

use crate::config::RetryConfig;
use crate::embedding::provider::{EmbeddingProvider, ProviderError};
use crate::errors::{RetrievalError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Wraps an [`EmbeddingProvider`] with the retry semantics shared by
/// ingestion and querying. Transient provider failures are retried up to
/// `max_retries` times with binary exponential backoff; exhaustion surfaces
/// as `EmbeddingUnavailable`, fatal for the current request.
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    retry: RetryConfig,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.with_retry(|| self.provider.embed_one(text)).await
    }

    /// Embed a batch of texts; output order matches input order and length
    /// matches input length exactly.
    ///
    /// A failing batch call falls back to per-item calls so one bad item
    /// cannot discard the others' embeddings; an item that still fails after
    /// its own retries fails the request.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match self.with_retry(|| self.provider.embed_many(texts)).await {
            Ok(vectors) => {
                if vectors.len() != texts.len() {
                    return Err(RetrievalError::EmbeddingUnavailable(format!(
                        "provider returned {} vectors for {} inputs",
                        vectors.len(),
                        texts.len()
                    )));
                }
                Ok(vectors)
            }
            Err(batch_err) => {
                warn!(error = %batch_err, "batch embedding failed, falling back to per-item calls");
                let mut vectors = Vec::with_capacity(texts.len());
                for text in texts {
                    vectors.push(self.embed(text).await?);
                }
                Ok(vectors)
            }
        }
    }

    /// Run a provider call, retrying transient failures with exponential
    /// backoff. Permanent failures return immediately.
    async fn with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ProviderError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_transient() {
                        return Err(RetrievalError::EmbeddingUnavailable(e.to_string()));
                    }

                    attempt += 1;
                    if attempt > self.retry.max_retries {
                        return Err(RetrievalError::EmbeddingUnavailable(format!(
                            "retries exhausted after {} attempts: {}",
                            attempt, e
                        )));
                    }

                    let delay = self.calculate_delay(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying embedding call");
                    sleep(delay).await;
                }
            }
        }
    }

    /// Binary exponential backoff with a cap and optional +/-25% jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .retry
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let delay_ms = exponential.min(self.retry.max_delay_ms);

        let final_delay = if self.retry.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }
}
