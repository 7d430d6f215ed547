//! Units of work submitted to the worker pool.

use std::fmt;

use tokio::sync::oneshot;

use crate::error::ServiceError;

/// Value delivered on a job's reply channel: a short code or long URL on success.
pub type JobReply = Result<String, ServiceError>;

/// Kind of work a [`Job`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Payload is a long URL; reply is its short code.
    Shorten,
    /// Payload is a short code; reply is its long URL.
    Resolve,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Shorten => "shorten",
            JobKind::Resolve => "resolve",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-use reply destination of a job.
///
/// Sending consumes the handle, so a job can be answered at most once. Sending
/// never waits for a reader: if the caller already gave up, the reply is dropped.
#[derive(Debug)]
pub struct ReplyTo(oneshot::Sender<JobReply>);

impl ReplyTo {
    /// Delivers the reply. Returns `false` if the caller stopped waiting.
    pub fn send(self, reply: JobReply) -> bool {
        self.0.send(reply).is_ok()
    }

    /// Returns true if the caller dropped its receiver.
    pub fn is_abandoned(&self) -> bool {
        self.0.is_closed()
    }
}

/// A shorten or resolve request travelling through the job queue.
#[derive(Debug)]
pub struct Job {
    pub kind: JobKind,
    pub payload: String,
    pub reply_to: ReplyTo,
}

impl Job {
    /// Creates a job and the receiver its reply will arrive on.
    pub fn new(kind: JobKind, payload: impl Into<String>) -> (Self, oneshot::Receiver<JobReply>) {
        let (tx, rx) = oneshot::channel();
        let job = Self {
            kind,
            payload: payload.into(),
            reply_to: ReplyTo(tx),
        };
        (job, rx)
    }

    pub fn shorten(long_url: impl Into<String>) -> (Self, oneshot::Receiver<JobReply>) {
        Self::new(JobKind::Shorten, long_url)
    }

    pub fn resolve(short_code: impl Into<String>) -> (Self, oneshot::Receiver<JobReply>) {
        Self::new(JobKind::Resolve, short_code)
    }
}
