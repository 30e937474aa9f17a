//! Bounded worker pool for render jobs.
//!
//! `min_workers` threads start eagerly and live as long as the pool. Jobs go
//! through a bounded queue; when it is full the pool grows up to
//! `max_workers`, and extra threads retire after `keep_alive` without work.
//! Once the pool is at its maximum and the queue is full, the submitting
//! thread runs the job itself, which slows producers down instead of
//! dropping work.
//!
//! A queued job always has a thread to run it: with no live worker the
//! submitter starts one, and a retiring worker that finds the queue non-empty
//! stays on.

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Thread pool with caller-runs backpressure.
pub struct RenderPool {
    config: PoolConfig,
    sender: Option<Sender<Job>>,
    receiver: Receiver<Job>,
    live: Arc<AtomicUsize>,
    spawned: AtomicUsize,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl RenderPool {
    /// Starts a pool with `config.min_workers` core threads.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity);
        let pool = Self {
            config,
            sender: Some(sender),
            receiver,
            live: Arc::new(AtomicUsize::new(0)),
            spawned: AtomicUsize::new(0),
            workers: Mutex::new(Vec::new()),
        };

        for _ in 0..pool.config.min_workers {
            pool.live.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = pool.spawn_worker(None, None) {
                pool.live.fetch_sub(1, Ordering::SeqCst);
                return Err(e);
            }
        }

        log::debug!(
            "render pool started: {} core, {} max, queue {}",
            pool.config.min_workers,
            pool.config.max_workers,
            pool.config.queue_capacity
        );
        Ok(pool)
    }

    /// Pool settings.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of worker threads currently alive.
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of jobs waiting in the queue.
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    /// Submits a job and returns a handle to its result.
    ///
    /// Never blocks on a full queue: the job either queues, starts on a new
    /// thread, or runs on the calling thread before this returns.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.dispatch(Box::new(move || {
            // The handle may have been dropped; the result is then discarded.
            let _ = tx.send(job());
        }));
        JobHandle { rx }
    }

    fn dispatch(&self, job: Job) {
        let Some(sender) = &self.sender else {
            run_job(job);
            return;
        };

        let job = match sender.try_send(job) {
            Ok(()) => {
                if self.live_workers() == 0 {
                    self.start_idle_worker();
                }
                return;
            }
            Err(TrySendError::Full(job)) | Err(TrySendError::Disconnected(job)) => job,
        };

        if let Some(job) = self.try_grow(job) {
            log::warn!(
                "render pool saturated ({} workers, {} queued), running job on caller thread",
                self.live_workers(),
                self.queued()
            );
            run_job(job);
        }
    }

    /// Starts an extra thread for `job` if the pool is below its maximum.
    /// Gives the job back when no thread could be started.
    fn try_grow(&self, job: Job) -> Option<Job> {
        if !reserve(&self.live, self.config.max_workers) {
            return Some(job);
        }

        // The first job travels through its own slot so it can be recovered
        // if the thread fails to start.
        let (first_tx, first_rx) = crossbeam_channel::bounded(1);
        let recovery = first_rx.clone();
        let _ = first_tx.send(job);

        match self.spawn_worker(Some(first_rx), Some(self.config.keep_alive)) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("failed to start extra render worker: {e}");
                self.live.fetch_sub(1, Ordering::SeqCst);
                recovery.try_recv().ok()
            }
        }
    }

    /// Starts an extra thread for work already sitting in the queue.
    fn start_idle_worker(&self) {
        if !reserve(&self.live, self.config.max_workers) {
            return;
        }
        if let Err(e) = self.spawn_worker(None, Some(self.config.keep_alive)) {
            self.live.fetch_sub(1, Ordering::SeqCst);
            log::warn!("failed to start render worker: {e}");
            if self.live_workers() == 0 {
                if let Ok(job) = self.receiver.try_recv() {
                    run_job(job);
                }
            }
        }
    }

    /// Spawns a thread that is already counted in `live`.
    fn spawn_worker(&self, first: Option<Receiver<Job>>, idle: Option<Duration>) -> Result<()> {
        let id = self.spawned.fetch_add(1, Ordering::Relaxed);
        let receiver = self.receiver.clone();
        let live = Arc::clone(&self.live);
        let max = self.config.max_workers;

        let handle = thread::Builder::new()
            .name(format!("{}-{id}", self.config.thread_name_prefix))
            .spawn(move || {
                if let Some(job) = first.and_then(|slot| slot.try_recv().ok()) {
                    run_job(job);
                }
                worker_loop(&receiver, idle, &live, max);
            })?;

        if let Ok(mut workers) = self.workers.lock() {
            workers.retain(|w| !w.is_finished());
            workers.push(handle);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPool")
            .field("config", &self.config)
            .field("live_workers", &self.live_workers())
            .field("queued", &self.queued())
            .finish()
    }
}

impl Drop for RenderPool {
    /// Lets workers drain the queue, then joins them.
    fn drop(&mut self) {
        self.sender.take();
        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for worker in workers {
            let _ = worker.join();
        }
    }
}

/// Core threads (`idle == None`) wait until the pool shuts down; extra threads
/// return after `idle` without work. Leaves `live` decremented on return.
fn worker_loop(
    receiver: &Receiver<Job>,
    idle: Option<Duration>,
    live: &AtomicUsize,
    max: usize,
) {
    loop {
        let job = match idle {
            None => receiver.recv().ok(),
            Some(timeout) => receiver.recv_timeout(timeout).ok(),
        };
        if let Some(job) = job {
            run_job(job);
            continue;
        }

        live.fetch_sub(1, Ordering::SeqCst);
        // A job queued after the timeout may have seen this thread as live.
        if receiver.is_empty() || !reserve(live, max) {
            return;
        }
    }
}

/// Counts one more live worker unless the pool is at `max`.
fn reserve(live: &AtomicUsize, max: usize) -> bool {
    live.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
        (n < max).then_some(n + 1)
    })
    .is_ok()
}

fn run_job(job: Job) {
    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
        log::error!("render job panicked");
    }
}

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle<T> {
    rx: Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks until the job finishes.
    ///
    /// Fails if the job panicked.
    pub fn join(self) -> Result<T> {
        self.rx
            .recv()
            .map_err(|_| Error::Io(io::Error::other("render job did not complete")))
    }
}
