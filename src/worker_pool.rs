//! # Worker Pool Module
//!
//! Fans rule work out across `may` coroutines and joins the results.
//!
//! ## Features
//!
//! - **Shared Queue**: jobs go into one may MPSC channel; every worker pulls from it,
//!   so load balances itself
//! - **Mutex-Guarded Results**: each job returns a batch that is appended to a shared list
//! - **Panic Recovery**: a panicking job is logged and contributes nothing
//! - **Cancellation**: workers stop taking jobs once the [`Cancellation`] flag is raised
//!   or the pool's deadline passes; whatever was collected is returned
//! - **Metrics**: dispatched, completed, panicked and skipped job counters

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use may::sync::mpsc;
use tracing::{debug, error, warn};

use crate::runtime_config::RuntimeConfig;

/// A unit of work producing a batch of results
pub type Job<T> = Box<dyn FnOnce() -> Vec<T> + Send + 'static>;

/// Configuration for a worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Number of worker coroutines
    pub num_workers: usize,
    /// Stack size for worker coroutines
    pub stack_size: usize,
    /// Stop taking new jobs after this long
    pub timeout: Option<Duration>,
}

impl WorkerPoolConfig {
    pub fn new(num_workers: usize, stack_size: usize, timeout: Option<Duration>) -> Self {
        Self {
            num_workers,
            stack_size,
            timeout,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from(RuntimeConfig::from_env())
    }
}

impl From<RuntimeConfig> for WorkerPoolConfig {
    fn from(config: RuntimeConfig) -> Self {
        Self {
            num_workers: config.workers,
            stack_size: config.stack_size,
            timeout: config.rule_timeout,
        }
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::from(RuntimeConfig::default())
    }
}

/// Cooperative cancellation flag shared by a run
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Metrics for a worker pool
#[derive(Debug, Default)]
pub struct WorkerPoolMetrics {
    /// Jobs queued
    pub dispatched_count: AtomicU64,
    /// Jobs that ran to completion
    pub completed_count: AtomicU64,
    /// Jobs that panicked
    pub panicked_count: AtomicU64,
    /// Jobs dropped because of cancellation or deadline
    pub skipped_count: AtomicU64,
}

impl WorkerPoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self) {
        self.completed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.panicked_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_dispatched_count(&self) -> u64 {
        self.dispatched_count.load(Ordering::Relaxed)
    }

    pub fn get_completed_count(&self) -> u64 {
        self.completed_count.load(Ordering::Relaxed)
    }

    pub fn get_panicked_count(&self) -> u64 {
        self.panicked_count.load(Ordering::Relaxed)
    }

    pub fn get_skipped_count(&self) -> u64 {
        self.skipped_count.load(Ordering::Relaxed)
    }
}

/// Lock a mutex, recovering the data if a worker panicked while holding it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A pool of worker coroutines for one fan-out
pub struct WorkerPool {
    name: String,
    config: WorkerPoolConfig,
    cancellation: Cancellation,
    metrics: Arc<WorkerPoolMetrics>,
}

impl WorkerPool {
    pub fn new(name: impl Into<String>, config: WorkerPoolConfig, cancellation: Cancellation) -> Self {
        Self {
            name: name.into(),
            config,
            cancellation,
            metrics: Arc::new(WorkerPoolMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<WorkerPoolMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Run every job and return the concatenated results once all workers have joined.
    ///
    /// Result order follows job completion, not submission.
    pub fn run<T: Send + 'static>(&self, jobs: Vec<Job<T>>) -> Vec<T> {
        if jobs.is_empty() {
            return Vec::new();
        }
        let job_count = jobs.len();
        let (tx, rx) = mpsc::channel::<Job<T>>();
        for job in jobs {
            self.metrics.record_dispatch();
            if tx.send(job).is_err() {
                self.metrics.record_skip();
            }
        }
        drop(tx);

        let rx = Arc::new(rx);
        let results: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::new()));
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let num_workers = self.config.num_workers.clamp(1, job_count);

        debug!(
            pool = %self.name,
            jobs = job_count,
            num_workers,
            stack_size = self.config.stack_size,
            "Starting worker pool"
        );

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let worker = Worker {
                pool: self.name.clone(),
                worker_id,
                rx: Arc::clone(&rx),
                results: Arc::clone(&results),
                metrics: Arc::clone(&self.metrics),
                cancellation: self.cancellation.clone(),
                deadline,
            };
            // SAFETY: the closure owns everything it touches (Arc clones and owned
            // values) and does not rely on thread-local storage, which is the
            // requirement `may` places on coroutine bodies.
            #[allow(unsafe_code)]
            let spawned = unsafe {
                may::coroutine::Builder::new()
                    .name(format!("{}-{}", self.name, worker_id))
                    .stack_size(self.config.stack_size)
                    .spawn(move || worker.run())
            };
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => error!(
                    pool = %self.name,
                    worker_id,
                    error = %e,
                    "Failed to spawn worker coroutine"
                ),
            }
        }

        if handles.is_empty() {
            warn!(pool = %self.name, "No worker could be spawned, running jobs inline");
            Worker {
                pool: self.name.clone(),
                worker_id: 0,
                rx: Arc::clone(&rx),
                results: Arc::clone(&results),
                metrics: Arc::clone(&self.metrics),
                cancellation: self.cancellation.clone(),
                deadline,
            }
            .run();
        }

        for handle in handles {
            if handle.join().is_err() {
                error!(pool = %self.name, "Worker coroutine terminated abnormally");
            }
        }

        let collected = std::mem::take(&mut *lock(&results));
        debug!(
            pool = %self.name,
            completed = self.metrics.get_completed_count(),
            panicked = self.metrics.get_panicked_count(),
            skipped = self.metrics.get_skipped_count(),
            "Worker pool joined"
        );
        collected
    }
}

struct Worker<T> {
    pool: String,
    worker_id: usize,
    rx: Arc<mpsc::Receiver<Job<T>>>,
    results: Arc<Mutex<Vec<T>>>,
    metrics: Arc<WorkerPoolMetrics>,
    cancellation: Cancellation,
    deadline: Option<Instant>,
}

impl<T: Send + 'static> Worker<T> {
    fn stopped(&self) -> bool {
        self.cancellation.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn run(self) {
        // the sender is gone before workers start, so an empty queue means done
        while let Ok(job) = self.rx.try_recv() {
            if self.stopped() {
                self.metrics.record_skip();
                continue;
            }
            match std::panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(batch) => {
                    lock(&self.results).extend(batch);
                    self.metrics.record_completion();
                }
                Err(panic) => {
                    self.metrics.record_panic();
                    error!(
                        pool = %self.pool,
                        worker_id = self.worker_id,
                        panic_message = ?panic,
                        "Job panicked"
                    );
                }
            }
        }
    }
}
