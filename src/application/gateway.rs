//! Entry point for shorten and resolve requests.
//!
//! A request is admitted by the per-client rate limiter, enqueued on the
//! worker pool, and then awaited until the caller's deadline. The same
//! deadline bounds both the wait for queue space and the wait for the reply.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

use crate::application::rate_limiter::ClientRateLimiter;
use crate::application::worker_pool::WorkerPool;
use crate::domain::job::{Job, JobReply};
use crate::error::ServiceError;

pub struct Gateway {
    pool: Arc<WorkerPool>,
    limiter: Arc<ClientRateLimiter>,
}

impl Gateway {
    pub fn new(pool: Arc<WorkerPool>, limiter: Arc<ClientRateLimiter>) -> Self {
        Self { pool, limiter }
    }

    /// Returns the short code for `long_url` on behalf of `client`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::RateLimited`] when `client` has no tokens left; nothing is enqueued
    /// - [`ServiceError::Timeout`] when no reply arrived before `deadline`
    /// - any error the job itself produced
    pub async fn shorten(
        &self,
        client: &str,
        long_url: &str,
        deadline: Instant,
    ) -> Result<String, ServiceError> {
        self.dispatch(client, Job::shorten(long_url), deadline).await
    }

    /// Returns the long URL behind `short_code` on behalf of `client`.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::shorten`], plus [`ServiceError::NotFound`] for
    /// unknown or expired codes.
    pub async fn resolve(
        &self,
        client: &str,
        short_code: &str,
        deadline: Instant,
    ) -> Result<String, ServiceError> {
        self.dispatch(client, Job::resolve(short_code), deadline).await
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    async fn dispatch(
        &self,
        client: &str,
        (job, reply): (Job, oneshot::Receiver<JobReply>),
        deadline: Instant,
    ) -> Result<String, ServiceError> {
        if !self.limiter.admit(client) {
            debug!(client, kind = %job.kind, "Request rejected by rate limiter");
            return Err(ServiceError::RateLimited);
        }

        let kind = job.kind;
        self.pool.submit(job, deadline).await?;

        match timeout_at(deadline, reply).await {
            Ok(Ok(result)) => result,
            Ok(Err(_dropped)) => Err(ServiceError::Internal(
                "job was dropped without a reply".to_string(),
            )),
            Err(_elapsed) => {
                debug!(client, %kind, "Deadline passed before the job replied");
                Err(ServiceError::Timeout)
            }
        }
    }
}
