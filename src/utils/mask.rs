//! Hexagon alpha masks.
//!
//! The hexagon is filled hard-edged at three times the requested resolution
//! and then shrunk with a Lanczos filter. That downsample is the only thing
//! smoothing the edges.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// Linear supersampling factor used before downsampling
pub const SUPERSAMPLE: u32 = 3;

/// Hexagon vertices for a `width x height` canvas, clockwise from the left point.
fn hexagon_vertices(width: u32, height: u32) -> [Point<i32>; 6] {
    let w = width as i32;
    let h = height as i32;
    // right-hand x mirrors the left inset
    let inset = w / 4;
    [
        Point::new(0, h / 2),
        Point::new(inset, 0),
        Point::new(w - inset, 0),
        Point::new(w, h / 2),
        Point::new(w - inset, h),
        Point::new(inset, h),
    ]
}

/// Generate an anti-aliased hexagon mask of exactly `width x height`.
///
/// Fully opaque inside the hexagon, fully transparent outside. The hexagon
/// touches the left and right edges at half height and the top and bottom
/// edges between the quarter and three-quarter marks.
pub fn generate(width: u32, height: u32) -> GrayImage {
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let big_width = width * SUPERSAMPLE;
    let big_height = height * SUPERSAMPLE;
    let mut big = GrayImage::from_pixel(big_width, big_height, Luma([0]));
    draw_polygon_mut(
        &mut big,
        &hexagon_vertices(big_width, big_height),
        Luma([255]),
    );

    imageops::resize(&big, width, height, FilterType::Lanczos3)
}
