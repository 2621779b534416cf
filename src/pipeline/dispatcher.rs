use crate::cards::catalog::fetch_catalog;
use crate::cards::CardDescriptor;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::queue::TaskQueue;
use crate::pipeline::worker::{RunReport, RunSummary, WorkerContext, WorkerPool};
use crate::utils::files::ensure_output_dir;
use crate::utils::http::{build_client, HttpImageSource, ImageSource};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs descriptors through a fixed worker pool and waits for all of them.
pub struct Dispatcher {
    worker_count: usize,
    source: Arc<dyn ImageSource>,
    output_dir: PathBuf,
    queue: Arc<TaskQueue<CardDescriptor>>,
    progress: Option<ProgressBar>,
}

impl Dispatcher {
    pub fn new(
        worker_count: usize,
        source: Arc<dyn ImageSource>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            worker_count: worker_count.max(1),
            source,
            output_dir: output_dir.into(),
            queue: Arc::new(TaskQueue::new()),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Handle to the task queue, e.g. for cancelling from a signal handler.
    pub fn queue(&self) -> Arc<TaskQueue<CardDescriptor>> {
        self.queue.clone()
    }

    /// Enqueue every descriptor, then block until each one is saved or skipped.
    pub async fn run(self, descriptors: Vec<CardDescriptor>) -> Result<RunReport> {
        ensure_output_dir(&self.output_dir)?;

        let summary = Arc::new(RunSummary::default());
        let ctx = Arc::new(WorkerContext {
            source: self.source,
            output_dir: self.output_dir,
            summary: summary.clone(),
            progress: self.progress,
        });

        let pool = WorkerPool::spawn(self.worker_count, self.queue.clone(), ctx);
        log::info!(
            "Dispatching {} cards to {} workers",
            descriptors.len(),
            pool.len()
        );

        let mut not_dispatched = 0;
        for card in descriptors {
            if let Err(card) = self.queue.enqueue(card) {
                log::debug!("queue closed, not dispatching card {}", card.code);
                not_dispatched += 1;
            }
        }
        if not_dispatched > 0 {
            log::warn!("{} cards were not dispatched after cancellation", not_dispatched);
        }

        self.queue.wait_until_all_done().await;
        self.queue.close();
        pool.join().await;

        Ok(RunReport {
            not_dispatched,
            ..summary.report()
        })
    }
}

/// Validate the config, fetch the catalog and build a dispatcher for it.
///
/// A catalog failure surfaces here, before anything is dispatched.
pub async fn prepare(config: &Config) -> Result<(Dispatcher, Vec<CardDescriptor>)> {
    config.validate()?;

    let client = build_client()?;
    let mut cards = fetch_catalog(&client, &config.catalog_url).await?;
    if let Some(limit) = config.limit {
        cards.truncate(limit);
    }

    let source = Arc::new(HttpImageSource::new(client, config.image_base_url.clone()));
    let dispatcher = Dispatcher::new(config.worker_count, source, config.output_dir.clone());
    Ok((dispatcher, cards))
}

