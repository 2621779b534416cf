//! Turn a card catalog into hexagonal PNG thumbnails.
//!
//! Cards are fetched from a remote catalog, queued, and processed by a fixed
//! pool of workers. Each worker downloads the card image, crops the art for
//! the card's type, rotates ice art upright, clips it to an anti-aliased
//! hexagon and writes `<code>.png`.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod cards;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod utils;

pub use cards::CardDescriptor;
pub use config::Config;
pub use error::PipelineError;
