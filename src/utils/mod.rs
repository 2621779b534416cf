//! Utility modules for HexThumbs
//!
//! - `files`: output directory management and atomic writes
//! - `http`: HTTP client and image sources
//! - `images`: cropping, compositing and PNG encoding
//! - `mask`: hexagon mask generation

pub mod files;
pub mod http;
pub mod images;
pub mod mask;
