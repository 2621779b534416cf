use anyhow::Context;
use clap::Parser;
use hexthumbs::config::{self, Config};
use hexthumbs::pipeline;
use hexthumbs::utils::files::count_thumbnails;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Download card images and turn them into hexagonal PNG thumbnails
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL of the card catalog (bare JSON array or object with a `data` array)
    #[arg(long, default_value = config::DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Base URL that relative card image paths are resolved against
    #[arg(long, default_value = config::DEFAULT_IMAGE_BASE_URL)]
    image_base_url: String,

    /// Directory where thumbnails are written
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Amount of cards to process
    #[arg(short, long, default_value = "all")]
    amount: String,

    /// Number of workers (defaults to number of CPU cores)
    #[arg(short = 't', long, default_value_t = thread::available_parallelism().map_or(1, |p| p.get()))]
    workers: usize,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        Ok(Config {
            worker_count: self.workers,
            catalog_url: self.catalog_url,
            image_base_url: self.image_base_url,
            output_dir: self.output_dir,
            limit: config::parse_amount(&self.amount)?,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    log::info!("Catalog: {}", config.catalog_url);
    log::info!("Output: {}", config.output_dir.display());

    let (dispatcher, cards) = pipeline::prepare(&config)
        .await
        .context("could not load the card catalog")?;

    let pb = ProgressBar::new(cards.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let queue = dispatcher.queue();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, letting in-flight cards finish");
            queue.cancel();
        }
    });

    let report = dispatcher.with_progress(pb.clone()).run(cards).await?;
    pb.finish_with_message("Thumbnails complete!");

    log::info!(
        "Saved {} thumbnails, skipped {} cards",
        report.saved,
        report.skipped
    );
    if report.not_dispatched > 0 {
        log::warn!("{} cards were never dispatched", report.not_dispatched);
    }

    match count_thumbnails(&config.output_dir) {
        Ok(count) => log::info!("Total thumbnails in {}: {}", config.output_dir.display(), count),
        Err(e) => log::error!("Error counting thumbnails: {}", e),
    }

    Ok(())
}
