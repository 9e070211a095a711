//! Provider capability interfaces
//!
//! Every provider implements [`Client`]. Synchronous and asynchronous
//! translation are optional capabilities, discovered at runtime through
//! [`Client::as_sync`] and [`Client::as_async`] so the orchestrator never
//! needs to know the concrete provider type.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::{AsyncResponse, JobStatus, ProviderId, Request, Response};

/// Identity and cost estimation, implemented by every provider
pub trait Client: Send + Sync {
    /// Provider identifier
    fn name(&self) -> ProviderId;

    /// Provider API version
    fn version(&self) -> &str;

    /// Estimated price of a request, without any network call
    fn get_cost(&self, request: &Request) -> f64;

    /// Billable characters of a request
    fn get_char_count(&self, request: &Request) -> usize;

    /// Get as synchronous capability if supported
    ///
    /// Returns None by default. Providers that translate immediately
    /// should override this method to return Some(self).
    fn as_sync(&self) -> Option<&dyn SyncClient> {
        None
    }

    /// Get as asynchronous (job based) capability if supported
    ///
    /// Returns None by default.
    fn as_async(&self) -> Option<&dyn AsyncClient> {
        None
    }
}

/// Immediate translation
#[async_trait]
pub trait SyncClient: Send + Sync {
    async fn translate(&self, ctx: &CancellationToken, request: &Request) -> Result<Response>;
}

/// Submit / poll / fetch translation jobs
///
/// The handle returned by [`AsyncClient::async_translate`] must be passed
/// unmodified to the other two calls.
#[async_trait]
pub trait AsyncClient: Send + Sync {
    /// Submit a job
    async fn async_translate(
        &self,
        ctx: &CancellationToken,
        request: &Request,
    ) -> Result<AsyncResponse>;

    /// Fetch a fresh status snapshot
    async fn check_status(&self, ctx: &CancellationToken, job: &AsyncResponse) -> Result<JobStatus>;

    /// Download the finished translation
    async fn get_result(&self, ctx: &CancellationToken, job: &AsyncResponse) -> Result<Response>;
}
