//! Error taxonomy for the thumbnail pipeline.
//!
//! [`PipelineError::CatalogFetch`] and [`PipelineError::Config`] come out of
//! [`crate::pipeline::prepare`]; I/O failures preparing the output directory
//! come out of [`crate::pipeline::Dispatcher::run`]. Every other variant is
//! raised inside a worker, logged, and counted as a skip.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to fetch card catalog: {0}")]
    CatalogFetch(String),

    #[error("failed to fetch image {reference}: {reason}")]
    ImageFetch { reference: String, reason: String },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("no crop region registered for type '{card_type}' (side: {side:?})")]
    UnknownType {
        card_type: String,
        side: Option<String>,
    },

    #[error("failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("card task panicked: {0}")]
    TaskPanicked(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    pub fn image_fetch(reference: &str, reason: impl ToString) -> Self {
        PipelineError::ImageFetch {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
