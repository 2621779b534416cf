use crate::cards::CardDescriptor;
use crate::error::{PipelineError, Result};
use crate::pipeline::queue::TaskQueue;
use crate::utils::files::write_atomic;
use crate::utils::http::ImageSource;
use crate::utils::images::{encode_png, transform};
use futures::FutureExt;
use indicatif::ProgressBar;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Per-run counters shared by all workers.
#[derive(Debug, Default)]
pub struct RunSummary {
    saved: AtomicUsize,
    skipped: AtomicUsize,
}

impl RunSummary {
    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Tasks that reached completion, saved or skipped.
    pub fn completed(&self) -> usize {
        self.saved() + self.skipped()
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            saved: self.saved(),
            skipped: self.skipped(),
            not_dispatched: 0,
        }
    }
}

/// Final counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub saved: usize,
    pub skipped: usize,
    /// Cards never queued because the run was cancelled first
    pub not_dispatched: usize,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.saved + self.skipped
    }
}

/// How a single task ended.
#[derive(Debug)]
pub enum TaskOutcome {
    Saved(PathBuf),
    Skipped(PipelineError),
    Cancelled,
}

/// Everything a worker needs besides the queue.
pub struct WorkerContext {
    pub source: Arc<dyn ImageSource>,
    pub output_dir: PathBuf,
    pub summary: Arc<RunSummary>,
    pub progress: Option<ProgressBar>,
}

/// Decode, transform, encode and write one card. Runs on the blocking pool.
fn render_and_save(card: &CardDescriptor, raw: &[u8], output_dir: &Path) -> Result<PathBuf> {
    let thumbnail = transform(card, raw)?;
    let png = encode_png(&thumbnail)?;
    Ok(write_atomic(output_dir, &card.output_file_name(), &png)?)
}

/// Run one task to completion. Never fails: errors become `Skipped`.
pub async fn process_card(ctx: &WorkerContext, card: CardDescriptor) -> TaskOutcome {
    let raw = match ctx.source.fetch(&card.image_reference).await {
        Ok(raw) => raw,
        Err(e) => return TaskOutcome::Skipped(e),
    };

    let output_dir = ctx.output_dir.clone();
    let rendered =
        tokio::task::spawn_blocking(move || render_and_save(&card, &raw, &output_dir)).await;

    match rendered {
        Ok(Ok(path)) => TaskOutcome::Saved(path),
        Ok(Err(e)) => TaskOutcome::Skipped(e),
        Err(join_err) => {
            TaskOutcome::Skipped(PipelineError::TaskPanicked(join_err.to_string()))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Like [`process_card`], but a panic anywhere in the task becomes a skip.
pub async fn run_task(ctx: &WorkerContext, card: CardDescriptor) -> TaskOutcome {
    match AssertUnwindSafe(process_card(ctx, card)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            TaskOutcome::Skipped(PipelineError::TaskPanicked(panic_message(payload)))
        }
    }
}

/// Pull tasks until the queue is closed and drained.
pub async fn worker_loop(
    id: usize,
    queue: Arc<TaskQueue<CardDescriptor>>,
    ctx: Arc<WorkerContext>,
) {
    while let Some(card) = queue.dequeue().await {
        let code = card.code.clone();
        let outcome = if queue.is_cancelled() {
            TaskOutcome::Cancelled
        } else {
            run_task(&ctx, card).await
        };

        match outcome {
            TaskOutcome::Saved(path) => {
                log::debug!("worker {}: saved {}", id, path.display());
                ctx.summary.saved.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Skipped(e) => {
                log::warn!("worker {}: skipping card {}: {}", id, code, e);
                ctx.summary.skipped.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Cancelled => {
                log::debug!("worker {}: run cancelled, dropping card {}", id, code);
                ctx.summary.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Some(pb) = &ctx.progress {
            pb.inc(1);
        }
        queue.mark_done();
    }
    log::debug!("worker {}: queue drained, exiting", id);
}

/// A fixed set of workers sharing one queue.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        worker_count: usize,
        queue: Arc<TaskQueue<CardDescriptor>>,
        ctx: Arc<WorkerContext>,
    ) -> Self {
        let handles = (0..worker_count)
            .map(|id| tokio::spawn(worker_loop(id, queue.clone(), ctx.clone())))
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit. The queue must already be closed.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("worker task panicked: {}", e);
            }
        }
    }
}
