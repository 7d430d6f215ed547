//! Fixed-size worker pool serializing store access through a bounded job queue.
//!
//! # Lifecycle
//!
//! - [`WorkerPool::start`] spawns `worker_count` workers sharing one FIFO queue
//! - [`WorkerPool::submit`] waits for queue space until the caller's deadline
//! - [`WorkerPool::stop`] lets in-flight jobs finish, closes the queue, and
//!   answers every job still queued with [`ServiceError::ShuttingDown`]
//!
//! Each job runs in its own task; a panic inside a job is reported to the
//! caller as [`ServiceError::Internal`] and the worker keeps serving.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use metrics::counter;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, warn};

use crate::application::services::UrlService;
use crate::domain::job::{Job, JobKind, JobReply};
use crate::error::ServiceError;

/// Default number of workers.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default job queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

type SharedQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Owns the workers and the job queue they share.
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    queue: SharedQueue,
    shutdown: watch::Sender<bool>,
    workers: parking_lot::Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    stopped: AtomicBool,
}

impl WorkerPool {
    /// Spawns the workers. Must be called from within a Tokio runtime.
    ///
    /// Zero sizes are raised to one.
    pub fn start(config: PoolConfig, service: Arc<UrlService>) -> Self {
        let worker_count = config.worker_count.max(1);
        let queue_capacity = config.queue_capacity.max(1);

        let (sender, receiver) = mpsc::channel(queue_capacity);
        let queue: SharedQueue = Arc::new(Mutex::new(receiver));
        let (shutdown, _) = watch::channel(false);

        let workers = (0..worker_count)
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: Arc::clone(&queue),
                    shutdown: shutdown.subscribe(),
                    service: Arc::clone(&service),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(worker_count, queue_capacity, "Worker pool started");

        Self {
            sender,
            queue,
            shutdown,
            workers: parking_lot::Mutex::new(workers),
            worker_count,
            stopped: AtomicBool::new(false),
        }
    }

    /// Enqueues a job, waiting for space until `deadline`.
    ///
    /// A full queue blocks the caller instead of dropping the job.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Timeout`] if no space freed up before `deadline`
    /// - [`ServiceError::ShuttingDown`] if the pool is stopping or stopped
    pub async fn submit(&self, job: Job, deadline: Instant) -> Result<(), ServiceError> {
        if self.is_stopped() {
            return Err(ServiceError::ShuttingDown);
        }

        match timeout_at(deadline, self.sender.send(job)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_closed)) => Err(ServiceError::ShuttingDown),
            Err(_elapsed) => {
                debug!("Job queue stayed full until the submission deadline");
                Err(ServiceError::Timeout)
            }
        }
    }

    /// Stops the pool.
    ///
    /// Signals every worker to exit after its current job, waits for them,
    /// then closes the queue and answers the jobs left in it. Calling `stop`
    /// again, or concurrently, returns immediately.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Stopping worker pool");
        self.shutdown.send_replace(true);

        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task ended abnormally");
            }
        }

        let mut queue = self.queue.lock().await;
        queue.close();

        let mut drained = 0usize;
        while let Ok(job) = queue.try_recv() {
            job.reply_to.send(Err(ServiceError::ShuttingDown));
            drained += 1;
        }

        info!(drained, "Worker pool stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Maximum number of queued jobs.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Number of jobs waiting in the queue.
    pub fn queued_jobs(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

/// One dequeue-process-reply loop.
struct Worker {
    id: usize,
    queue: SharedQueue,
    shutdown: watch::Receiver<bool>,
    service: Arc<UrlService>,
}

impl Worker {
    async fn run(mut self) {
        debug!(worker_id = self.id, "Worker started");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let job = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                job = next_job(&self.queue) => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            self.process(job).await;
        }

        debug!(worker_id = self.id, "Worker stopped");
    }

    /// Runs one job and sends exactly one reply.
    ///
    /// Jobs whose caller already stopped waiting are skipped.
    async fn process(&self, job: Job) {
        let Job {
            kind,
            payload,
            reply_to,
        } = job;

        if reply_to.is_abandoned() {
            debug!(worker_id = self.id, %kind, "Caller stopped waiting, job skipped");
            counter!("jobs_processed_total", "kind" => kind.as_str(), "outcome" => "abandoned")
                .increment(1);
            return;
        }

        let service = Arc::clone(&self.service);
        let task = tokio::spawn(async move {
            match kind {
                JobKind::Shorten => service.shorten(&payload).await,
                JobKind::Resolve => service.resolve(&payload).await,
            }
        });

        let reply: JobReply = match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(worker_id = self.id, %kind, error = %e, "Job panicked");
                Err(ServiceError::Internal("job failed unexpectedly".to_string()))
            }
        };

        let outcome = match &reply {
            Ok(_) => "ok",
            Err(e) => e.label(),
        };
        counter!("jobs_processed_total", "kind" => kind.as_str(), "outcome" => outcome)
            .increment(1);

        if let Err(e @ (ServiceError::StoreUnavailable(_) | ServiceError::GenerationExhausted { .. })) =
            &reply
        {
            warn!(worker_id = self.id, %kind, error = %e, "Job failed");
        }

        if !reply_to.send(reply) {
            debug!(worker_id = self.id, %kind, "Caller stopped waiting, reply discarded");
        }
    }
}

async fn next_job(queue: &Mutex<mpsc::Receiver<Job>>) -> Option<Job> {
    queue.lock().await.recv().await
}
