//! # Bounded worker pool for async listeners.
//!
//! [`AsyncExecutor`] runs async listener invocations off the publisher's path.
//!
//! ## Architecture
//! ```text
//! submit(inv)
//!     │            OverflowPolicy on full:
//!     │              Block{timeout} → wait, then QueueFull
//!     │              Drop           → QueueFull now
//!     │              Grow           → transient task (TaskTracker)
//!     ▼
//! [bounded queue] ──► worker 1 ──► invoke() ──► failure → Diagnostic
//!                 ├─► worker 2 ──► invoke()
//!                 └─► worker N ──► invoke()
//! ```
//!
//! ## Rules
//! - **No ordering** across invocations, even for the same event.
//! - **Isolation**: a failing or panicking listener never kills its worker.
//! - **Drain**: stop intake → wait for queued + running up to a deadline →
//!   on timeout cancel workers and report unstarted invocations as cancelled.
//! - **Started invocations are never aborted by drain**; only `force_stop` aborts,
//!   including transient `Grow` tasks.
//! - Once a drain gives up, the queue is closed: a submitter still blocked on a
//!   full queue gets `Closed` instead of landing in a queue nobody reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics::{Bus, Diagnostic, DiagnosticKind};
use crate::dispatch::OverflowPolicy;
use crate::dispatch::invoke::invoke;
use crate::error::{CancelledInvocation, ExecutorError, SubmitError};
use crate::events::Event;
use crate::registry::Registration;

use super::inflight::InFlight;

/// One async listener call waiting for a worker.
pub struct Invocation {
    pub(crate) registration: Arc<Registration>,
    pub(crate) event: Event,
    pub(crate) timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(registration: Arc<Registration>, event: Event) -> Self {
        let timeout = registration.timeout;
        Self {
            registration,
            event,
            timeout,
        }
    }

    /// Overrides the timeout (falls back to the registration's own).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = self.registration.timeout.or(timeout);
        self
    }

    fn cancelled(&self) -> CancelledInvocation {
        CancelledInvocation {
            listener: self.registration.name().to_owned(),
            event_seq: self.event.seq,
            event_type: self.event.event_type().clone(),
        }
    }
}

/// Result of a drain that finished within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    pub elapsed: Duration,
    /// Invocations completed over the executor's lifetime.
    pub completed: u64,
    /// Of those, how many failed.
    pub failed: u64,
}

/// Point-in-time executor counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorStats {
    pub workers: usize,
    pub capacity: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub completed: u64,
    pub failed: u64,
    pub accepting: bool,
}

/// Counters and tracking shared with worker tasks.
struct Shared {
    bus: Bus,
    in_flight: Arc<InFlight>,
    queued: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Shared {
    async fn run(&self, inv: Invocation) {
        let _guard = self
            .in_flight
            .enter(inv.registration.name(), inv.event.seq);
        let out = invoke(&inv.registration, &inv.event, inv.timeout, &self.bus).await;
        self.completed.fetch_add(1, AtomicOrdering::Relaxed);
        if out.result.is_err() {
            self.failed.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }
}

/// Bounded queue + fixed worker pool.
pub struct AsyncExecutor {
    workers: usize,
    capacity: usize,
    overflow: OverflowPolicy,
    default_timeout: Option<Duration>,

    sender: Mutex<Option<mpsc::Sender<Invocation>>>,
    queue: Arc<tokio::sync::Mutex<mpsc::Receiver<Invocation>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    transient: TaskTracker,
    token: CancellationToken,
    halt: CancellationToken,
    shared: Arc<Shared>,
}

impl AsyncExecutor {
    /// Creates the queue and spawns the workers. Must be called inside a Tokio runtime.
    pub fn start(cfg: &Config, bus: Bus) -> Arc<Self> {
        let workers = cfg.workers_clamped();
        let capacity = cfg.queue_capacity_clamped();
        let (tx, rx) = mpsc::channel::<Invocation>(capacity);

        let exec = Arc::new(Self {
            workers,
            capacity,
            overflow: cfg.overflow,
            default_timeout: cfg.default_listener_timeout(),
            sender: Mutex::new(Some(tx)),
            queue: Arc::new(tokio::sync::Mutex::new(rx)),
            handles: Mutex::new(Vec::with_capacity(workers)),
            transient: TaskTracker::new(),
            token: CancellationToken::new(),
            halt: CancellationToken::new(),
            shared: Arc::new(Shared {
                bus,
                in_flight: InFlight::new(),
                queued: AtomicUsize::new(0),
                completed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        });

        let mut handles = exec.handles.lock();
        for id in 0..workers {
            let queue = Arc::clone(&exec.queue);
            let token = exec.token.clone();
            let shared = Arc::clone(&exec.shared);
            handles.push(tokio::spawn(worker_loop(id, queue, token, shared)));
        }
        drop(handles);

        debug!(workers, capacity, overflow = ?cfg.overflow, "async executor started");
        exec
    }

    /// Enqueues an invocation according to the overflow policy.
    pub async fn submit(&self, inv: Invocation) -> Result<(), SubmitError> {
        let Some(tx) = self.sender.lock().clone() else {
            return Err(SubmitError::Closed);
        };
        let inv = inv.with_timeout(self.default_timeout);

        // Counted before sending so a fast worker never decrements first.
        self.shared.queued.fetch_add(1, AtomicOrdering::Relaxed);
        let res = match self.overflow {
            OverflowPolicy::Block { timeout } => {
                let started = Instant::now();
                match tx.send_timeout(inv, timeout).await {
                    Ok(()) => Ok(()),
                    Err(mpsc::error::SendTimeoutError::Timeout(_)) => Err(SubmitError::QueueFull {
                        capacity: self.capacity,
                        waited: started.elapsed(),
                    }),
                    Err(mpsc::error::SendTimeoutError::Closed(_)) => Err(SubmitError::Closed),
                }
            }
            OverflowPolicy::Drop => match tx.try_send(inv) {
                Ok(()) => Ok(()),
                Err(mpsc::error::TrySendError::Full(_)) => Err(SubmitError::QueueFull {
                    capacity: self.capacity,
                    waited: Duration::ZERO,
                }),
                Err(mpsc::error::TrySendError::Closed(_)) => Err(SubmitError::Closed),
            },
            OverflowPolicy::Grow => match tx.try_send(inv) {
                Ok(()) => Ok(()),
                Err(mpsc::error::TrySendError::Full(inv)) => {
                    let shared = Arc::clone(&self.shared);
                    shared.queued.fetch_sub(1, AtomicOrdering::Relaxed);
                    debug!(listener = inv.registration.name(), "async queue full; growing");
                    let halt = self.halt.clone();
                    self.transient.spawn(async move {
                        tokio::select! {
                            _ = halt.cancelled() => {}
                            _ = shared.run(inv) => {}
                        }
                    });
                    return Ok(());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => Err(SubmitError::Closed),
            },
        };

        if let Err(e) = &res {
            self.shared.queued.fetch_sub(1, AtomicOrdering::Relaxed);
            debug!(label = e.as_label(), error = %e, "async submission rejected");
        }
        res
    }

    /// Stops intake and waits up to `deadline` for queued and running invocations.
    ///
    /// On timeout, workers stop pulling from the queue, unstarted invocations
    /// are reported as cancelled, and running ones are left to finish.
    pub async fn drain(&self, deadline: Duration) -> Result<DrainSummary, ExecutorError> {
        let started = Instant::now();
        self.close_intake();
        self.shared
            .bus
            .publish(Diagnostic::new(DiagnosticKind::DrainStarted));
        info!(deadline = ?deadline, queued = self.queued(), "draining async executor");

        let mut handles = std::mem::take(&mut *self.handles.lock());
        let transient = self.transient.clone();
        let all_done = async {
            for h in handles.iter_mut() {
                let _ = h.await;
            }
            transient.wait().await;
        };

        let waited = time::timeout(deadline, all_done).await;
        match waited {
            Ok(()) => {
                let elapsed = started.elapsed();
                self.shared.bus.publish(
                    Diagnostic::new(DiagnosticKind::DrainCompleted).with_elapsed(elapsed),
                );
                info!(elapsed = ?elapsed, "async executor drained");
                Ok(DrainSummary {
                    elapsed,
                    completed: self.shared.completed.load(AtomicOrdering::Relaxed),
                    failed: self.shared.failed.load(AtomicOrdering::Relaxed),
                })
            }
            Err(_elapsed) => {
                self.token.cancel();
                let cancelled = self.cancel_queued().await;
                let running = self.shared.in_flight.snapshot();
                handles.retain(|h| !h.is_finished());
                self.handles.lock().extend(handles);

                self.shared.bus.publish(
                    Diagnostic::new(DiagnosticKind::DrainTimedOut)
                        .with_reason(format!(
                            "cancelled={} running={}",
                            cancelled.len(),
                            running.len()
                        ))
                        .with_elapsed(started.elapsed()),
                );
                warn!(
                    deadline = ?deadline,
                    cancelled = cancelled.len(),
                    running = ?running,
                    "async executor drain deadline exceeded"
                );
                Err(ExecutorError::DrainTimeout {
                    deadline,
                    cancelled,
                    running,
                })
            }
        }
    }

    /// Stops intake, aborts workers and transient tasks (and the invocations
    /// they are running), and reports queued invocations as cancelled.
    pub async fn force_stop(&self) -> Vec<CancelledInvocation> {
        self.close_intake();
        self.token.cancel();
        self.halt.cancel();
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for h in &handles {
            h.abort();
        }
        for h in handles {
            let _ = h.await;
        }
        self.transient.wait().await;
        let cancelled = self.cancel_queued().await;
        warn!(cancelled = cancelled.len(), "async executor force-stopped");
        cancelled
    }

    /// Token cancelled when the executor gives up on pending work; listeners
    /// may watch it to stop cooperatively.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn is_accepting(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Invocations accepted into the queue but not yet picked up.
    pub fn queued(&self) -> usize {
        self.shared.queued.load(AtomicOrdering::Relaxed)
    }

    /// Invocations currently running.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            workers: self.workers,
            capacity: self.capacity,
            queued: self.queued(),
            in_flight: self.in_flight(),
            completed: self.shared.completed.load(AtomicOrdering::Relaxed),
            failed: self.shared.failed.load(AtomicOrdering::Relaxed),
            accepting: self.is_accepting(),
        }
    }

    fn close_intake(&self) {
        if self.sender.lock().take().is_some() {
            self.transient.close();
            debug!("async executor stopped accepting submissions");
        }
    }

    /// Closes the queue and empties it, reporting each unstarted invocation as
    /// cancelled. Blocked submitters are released with `Closed`.
    async fn cancel_queued(&self) -> Vec<CancelledInvocation> {
        let mut rx = self.queue.lock().await;
        rx.close();
        let mut cancelled = Vec::new();
        // Returns `None` only once the buffer is empty and no send is mid-flight.
        while let Some(inv) = rx.recv().await {
            self.shared.queued.fetch_sub(1, AtomicOrdering::Relaxed);
            self.shared.bus.publish(
                Diagnostic::new(DiagnosticKind::InvocationCancelled)
                    .with_listener(inv.registration.name())
                    .with_mode(inv.registration.mode)
                    .with_event(&inv.event),
            );
            cancelled.push(inv.cancelled());
        }
        cancelled
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<tokio::sync::Mutex<mpsc::Receiver<Invocation>>>,
    token: CancellationToken,
    shared: Arc<Shared>,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            inv = async { queue.lock().await.recv().await } => inv,
        };
        let Some(inv) = next else { break };

        shared.queued.fetch_sub(1, AtomicOrdering::Relaxed);
        shared.run(inv).await;
    }
    debug!(worker = id, "async worker exited");
}
