use crate::error::{PipelineError, Result};
use std::path::PathBuf;
use std::thread;

pub const DEFAULT_CATALOG_URL: &str = "https://netrunnerdb.com/api/2.0/public/cards";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://netrunnerdb.com";
pub const DEFAULT_OUTPUT_DIR: &str = "thumbs";

/// Runtime settings for one thumbnail run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent workers draining the task queue
    pub worker_count: usize,
    /// Endpoint returning the card list
    pub catalog_url: String,
    /// Base URL that relative image references are joined onto
    pub image_base_url: String,
    /// Directory receiving one `<code>.png` per processed card
    pub output_dir: PathBuf,
    /// Process only the first N catalog entries
    pub limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: thread::available_parallelism().map_or(1, |p| p.get()),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            limit: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(PipelineError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.catalog_url.is_empty() {
            return Err(PipelineError::Config("catalog URL is empty".to_string()));
        }
        Ok(())
    }
}

/// Parse the `--amount` argument: `all` or a card count.
pub fn parse_amount(amount: &str) -> Result<Option<usize>> {
    if amount.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match amount.parse::<usize>() {
        Ok(0) | Err(_) => Err(PipelineError::Config(format!(
            "invalid amount value: {} (expected 'all' or a positive integer)",
            amount
        ))),
        Ok(n) => Ok(Some(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_all_and_numbers() {
        assert_eq!(parse_amount("all").unwrap(), None);
        assert_eq!(parse_amount("ALL").unwrap(), None);
        assert_eq!(parse_amount("25").unwrap(), Some(25));
        assert!(matches!(
            parse_amount("lots"),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert!(matches!(parse_amount("0"), Err(PipelineError::Config(_))));
        assert_eq!(parse_amount("1").unwrap(), Some(1));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = Config {
            worker_count: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
