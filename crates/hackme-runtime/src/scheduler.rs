//! Session-scoped cancellable continuations.
//!
//! Every delayed story beat, background reveal worker, and in-flight command
//! runs as a task spawned here. All of them race against one shared cancel
//! signal; [`Scheduler::cancel`] stops them at their next suspension point.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Inner {
    cancel: watch::Sender<bool>,
    live: AtomicUsize,
}

/// Spawner for cancellable tasks. Clones share the same cancel signal.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cancelled", &self.is_cancelled())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Read side of the cancel signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Whether the session has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the session is cancelled.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|c| *c).await;
    }
}

/// Decrements the live-task count however the task ends.
struct LiveGuard(Arc<Inner>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Scheduler {
    /// Create a scheduler with no tasks and the cancel signal clear.
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                cancel,
                live: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to the cancel signal.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.inner.cancel.subscribe(),
        }
    }

    /// Whether [`Scheduler::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancel.borrow()
    }

    /// Number of spawned tasks that have not finished or been cancelled.
    pub fn pending(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Run `fut` until it completes or the session is cancelled.
    ///
    /// Returns `None` without spawning when the session is already cancelled.
    pub fn spawn<F>(&self, label: &'static str, fut: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_cancelled() {
            log::debug!("not scheduling '{label}': session cancelled");
            return None;
        }
        let mut token = self.token();
        self.inner.live.fetch_add(1, Ordering::AcqRel);
        let guard = LiveGuard(Arc::clone(&self.inner));
        Some(tokio::spawn(async move {
            let _guard = guard;
            tokio::select! {
                _ = fut => {},
                _ = token.cancelled() => log::debug!("cancelled '{label}'"),
            }
        }))
    }

    /// Run `fut` after `delay`, unless the session is cancelled first.
    pub fn after<F>(&self, delay: Duration, label: &'static str, fut: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(label, async move {
            tokio::time::sleep(delay).await;
            fut.await;
        })
    }

    /// Cancel every pending and future task of this session.
    pub fn cancel(&self) {
        if !self.inner.cancel.send_replace(true) {
            log::info!("session cancelled with {} pending tasks", self.pending());
        }
    }
}
