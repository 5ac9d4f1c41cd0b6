//! Ordered line output for one surface.
//!
//! Lines go into an unbounded FIFO drained by a single worker task. The worker
//! reveals a line (instantly, or character by character with a random delay
//! per character), optionally holds it on screen, and only then signals the
//! line's [`Completion`] and moves on. Output order on a surface therefore
//! always equals enqueue order, whatever the delays.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use hackme_types::collab::{StyleHint, SurfaceRenderer};
use hackme_types::config::{RevealMode, SurfaceConfig};
use rand::Rng;
use tokio::sync::{mpsc, oneshot};

use crate::scheduler::Scheduler;

enum Op {
    Line(String, StyleHint),
    Clear,
}

struct Job {
    op: Op,
    done: oneshot::Sender<()>,
}

/// Resolves when the queued operation has been fully rendered.
///
/// Also resolves if the session is cancelled before that happens; dropping it
/// does not cancel the operation.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.rx).poll(cx).map(|_| ())
    }
}

/// Handle to one surface's FIFO. Cheap to clone; clones share the queue.
#[derive(Clone)]
pub struct OutputSequencer {
    name: &'static str,
    tx: mpsc::UnboundedSender<Job>,
}

impl std::fmt::Debug for OutputSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSequencer")
            .field("name", &self.name)
            .finish()
    }
}

impl OutputSequencer {
    /// Start the worker for a surface on the session scheduler.
    pub fn spawn(
        name: &'static str,
        renderer: Arc<dyn SurfaceRenderer>,
        config: SurfaceConfig,
        scheduler: &Scheduler,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        scheduler.spawn("output sequencer", drain(name, rx, renderer, config));
        Self { name, tx }
    }

    /// Surface name used in log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn push(&self, op: Op) -> Completion {
        let (done, rx) = oneshot::channel();
        if self.tx.send(Job { op, done }).is_err() {
            // Worker is gone (session cancelled); the dropped sender resolves the completion.
            log::debug!("surface '{}' closed, dropping output", self.name);
        }
        Completion { rx }
    }

    /// Queue a line with a style hint.
    pub fn enqueue(&self, text: impl Into<String>, style: StyleHint) -> Completion {
        self.push(Op::Line(text.into(), style))
    }

    /// Queue a plain line.
    pub fn line(&self, text: impl Into<String>) -> Completion {
        self.enqueue(text, StyleHint::Normal)
    }

    /// Queue a surface clear, ordered with the lines around it.
    pub fn clear(&self) -> Completion {
        self.push(Op::Clear)
    }

    /// Queue several lines and wait for the last one.
    pub async fn lines<I, S>(&self, lines: I, style: StyleHint)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut last = None;
        for line in lines {
            last = Some(self.enqueue(line, style));
        }
        if let Some(done) = last {
            done.await;
        }
    }
}

async fn drain(
    name: &'static str,
    mut rx: mpsc::UnboundedReceiver<Job>,
    renderer: Arc<dyn SurfaceRenderer>,
    config: SurfaceConfig,
) {
    let hold = Duration::from_millis(config.hold_ms);
    while let Some(job) = rx.recv().await {
        match job.op {
            Op::Clear => renderer.clear(),
            Op::Line(text, style) => {
                if config.reveal == RevealMode::Typewriter {
                    typewrite(renderer.as_ref(), &text, style, &config).await;
                }
                renderer.append_line(&text, style);
                if !hold.is_zero() {
                    tokio::time::sleep(hold).await;
                }
            },
        }
        let _ = job.done.send(());
    }
    log::debug!("surface '{name}' drained");
}

async fn typewrite(renderer: &dyn SurfaceRenderer, text: &str, style: StyleHint, config: &SurfaceConfig) {
    let (lo, hi) = config.char_delay_bounds();
    let mut partial = String::with_capacity(text.len());
    for ch in text.chars() {
        partial.push(ch);
        renderer.reveal(&partial, style);
        tokio::time::sleep(jitter(lo, hi)).await;
    }
}

fn jitter(lo: Duration, hi: Duration) -> Duration {
    if lo >= hi {
        return lo;
    }
    rand::thread_rng().gen_range(lo..=hi)
}
