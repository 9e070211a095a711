//! Translation orchestrator
//!
//! Routes a request to the capability the client actually implements and
//! turns asynchronous jobs into a single call: submit, poll until the job is
//! terminal, fetch the result.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Cancelled, ErrorKind, Result, TranslateError};
use crate::core::models::{Format, Request, Response};
use crate::core::provider::{AsyncClient, Client};

/// Default wait between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default width of the batch worker pool
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Orchestrates sync and async translation workflows
#[derive(Debug, Clone)]
pub struct Translator {
    poll_interval: Duration,
    max_concurrent: usize,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Translate one request, waiting for async jobs to finish
    ///
    /// Provider errors are returned unchanged.
    pub async fn translate(
        &self,
        ctx: &CancellationToken,
        request: &Request,
        client: &dyn Client,
    ) -> Result<Response> {
        let provider = client.name();

        match request.req_type {
            Format::File => {
                let Some(async_client) = client.as_async() else {
                    return Err(TranslateError::new(
                        ErrorKind::InvalidRequest,
                        "translate",
                        provider.as_str(),
                        "client does not support file translation",
                    ));
                };
                self.complete_async(ctx, request, async_client, provider.as_str())
                    .await
            }
            Format::Text | Format::Json => {
                let Some(sync_client) = client.as_sync() else {
                    return Err(TranslateError::new(
                        ErrorKind::InvalidRequest,
                        "translate",
                        provider.as_str(),
                        format!("client does not support {} translation", request.req_type),
                    ));
                };
                debug!("Translating {} segments with {}", request.text.len(), provider);
                sync_client.translate(ctx, request).await
            }
        }
    }

    /// Submit, poll until terminal, then fetch the result
    async fn complete_async(
        &self,
        ctx: &CancellationToken,
        request: &Request,
        client: &dyn AsyncClient,
        provider: &str,
    ) -> Result<Response> {
        let job = client.async_translate(ctx, request).await?;
        info!("Submitted job {} to {}", job.document_id, provider);

        loop {
            let status = client.check_status(ctx, &job).await?;

            if status.failed {
                return Err(TranslateError::new(
                    ErrorKind::ProviderApi,
                    "check_status",
                    provider,
                    format!("translation failed: {}", status.message),
                ));
            }
            if status.done {
                break;
            }

            debug!(
                "Job {} pending ({}s remaining) {}",
                job.document_id, status.seconds_remaining, status.message
            );

            tokio::select! {
                _ = ctx.cancelled() => {
                    warn!("Job {} abandoned: context cancelled", job.document_id);
                    return Err(TranslateError::new(
                        ErrorKind::Network,
                        "poll_status",
                        provider,
                        Cancelled,
                    ));
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        let response = client.get_result(ctx, &job).await?;
        info!("Job {} completed", job.document_id);
        Ok(response)
    }

    /// Translate every request, one result slot per input index
    ///
    /// Requests run on a bounded worker pool; a failure only fills its own
    /// slot.
    pub async fn batch_translate(
        &self,
        ctx: &CancellationToken,
        requests: &[Request],
        client: &dyn Client,
    ) -> Vec<Result<Response>> {
        let jobs: Vec<_> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| async move {
                (index, self.translate(ctx, request, client).await)
            })
            .collect();

        let mut finished: Vec<(usize, Result<Response>)> = stream::iter(jobs)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        finished.sort_by_key(|(index, _)| *index);
        finished
            .into_iter()
            .map(|(index, result)| {
                if let Err(e) = &result {
                    warn!("Request {} failed: {}", index, e);
                }
                result
            })
            .collect()
    }
}

/// Translate with the default orchestrator settings
pub async fn translate(
    ctx: &CancellationToken,
    request: &Request,
    client: &dyn Client,
) -> Result<Response> {
    Translator::default().translate(ctx, request, client).await
}

/// Batch-translate with the default orchestrator settings
pub async fn batch_translate(
    ctx: &CancellationToken,
    requests: &[Request],
    client: &dyn Client,
) -> Vec<Result<Response>> {
    Translator::default()
        .batch_translate(ctx, requests, client)
        .await
}
