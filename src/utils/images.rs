use crate::cards::crops::{self, CropRegion};
use crate::cards::CardDescriptor;
use crate::error::{PipelineError, Result};
use crate::utils::mask;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{imageops, GrayImage, Rgba, RgbaImage};

/// Vertical offset that centres the hexagon inside a square canvas of `width`.
pub fn paste_offset(width: u32) -> i64 {
    let half_gap = (1.0 - 3f64.sqrt() / 2.0) / 2.0;
    (half_gap * width as f64).round() as i64
}

/// Decode raw image bytes into an RGBA buffer.
pub fn decode(raw: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(raw).map_err(|e| PipelineError::Decode(e.to_string()))?;
    Ok(img.into_rgba8())
}

/// Crop `img` to `region`, padding any part outside the image with transparent pixels.
pub fn crop(img: &RgbaImage, region: CropRegion) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(region.width(), region.height(), Rgba([0, 0, 0, 0]));
    imageops::replace(&mut out, img, -(region.left as i64), -(region.top as i64));
    out
}

/// Paste `src` onto `canvas` at (`x`, `y`), using `stencil` as per-pixel alpha.
///
/// Parts of `src` falling outside the canvas are dropped.
fn paste_masked(canvas: &mut RgbaImage, src: &RgbaImage, stencil: &GrayImage, x: i64, y: i64) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let dx = x + sx as i64;
        let dy = y + sy as i64;
        if dx < 0 || dy < 0 || dx >= canvas_w as i64 || dy >= canvas_h as i64 {
            continue;
        }

        let alpha = stencil.get_pixel(sx, sy)[0] as u32;
        let dst = canvas.get_pixel_mut(dx as u32, dy as u32);
        for c in 0..4 {
            let blended = pixel[c] as u32 * alpha + dst[c] as u32 * (255 - alpha);
            dst[c] = ((blended + 127) / 255) as u8;
        }
    }
}

/// Turn one card's source image into its hexagonal thumbnail.
pub fn transform(card: &CardDescriptor, raw: &[u8]) -> Result<RgbaImage> {
    let img = decode(raw)?;
    let region = crops::lookup_for(card)?;

    let mut cropped = crop(&img, region);
    if card.is_ice() {
        // ice art is printed sideways
        cropped = imageops::rotate270(&cropped);
    }

    let (w, h) = cropped.dimensions();
    let stencil = mask::generate(w, h);

    let mut canvas = RgbaImage::from_pixel(w, w, Rgba([0, 0, 0, 0]));
    paste_masked(&mut canvas, &cropped, &stencil, 0, paste_offset(w));
    Ok(canvas)
}

/// Encode a thumbnail as PNG with maximum compression.
pub fn encode_png(thumbnail: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
    thumbnail
        .write_with_encoder(encoder)
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn card(card_type: &str, side: Option<&str>) -> CardDescriptor {
        CardDescriptor {
            code: "01001".to_string(),
            title: "Test".to_string(),
            card_type: card_type.to_string(),
            side: side.map(str::to_string),
            image_reference: "/card_image/01001.png".to_string(),
        }
    }

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn offset_centres_hexagon_height() {
        assert_eq!(paste_offset(0), 0);
        assert_eq!(paste_offset(211), 14);
        assert_eq!(paste_offset(218), 15);
    }

    #[test]
    fn crop_pads_outside_the_source() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255]));
        let region = CropRegion {
            left: 2,
            top: -3,
            right: 8,
            bottom: 5,
        };
        let out = crop(&img, region);

        assert_eq!(out.dimensions(), (6, 8));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(0, 3), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn thumbnail_is_square_and_clipped() {
        let source = RgbImage::from_pixel(300, 300, Rgb([200, 40, 40]));
        let thumb = transform(&card("agenda", None), &png_bytes(&source)).unwrap();

        assert_eq!(thumb.dimensions(), (211, 211));
        assert_eq!(thumb.get_pixel(0, 0)[3], 0);
        assert_eq!(thumb.get_pixel(105, 5)[3], 0);
        assert!(thumb.get_pixel(105, 120)[3] > 250);
    }

    #[test]
    fn transform_is_deterministic() {
        let source = RgbImage::from_fn(300, 419, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
        let raw = png_bytes(&source);
        let corp = card("identity", Some("corp"));

        let first = encode_png(&transform(&corp, &raw).unwrap()).unwrap();
        let second = encode_png(&transform(&corp, &raw).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ice_is_rotated_counter_clockwise() {
        // Marker sits on the left edge of the crop, vertically centred.
        let mut source = RgbImage::from_pixel(300, 450, Rgb([128, 128, 128]));
        for y in 309..327 {
            for x in 68..88 {
                source.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        let thumb = transform(&card("ice", None), &png_bytes(&source)).unwrap();

        assert_eq!(thumb.dimensions(), (218, 218));
        let rotated = thumb.get_pixel(109, 200);
        assert!(rotated[0] > 200 && rotated[1] < 60 && rotated[3] > 200);
        let unrotated = thumb.get_pixel(30, 124);
        assert!(unrotated[1] > 60);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            transform(&card("agenda", None), b"definitely not an image"),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn unknown_side_is_reported() {
        let source = RgbImage::from_pixel(300, 300, Rgb([1, 2, 3]));
        assert!(matches!(
            transform(&card("identity", Some("neutral")), &png_bytes(&source)),
            Err(PipelineError::UnknownType { .. })
        ));
    }

    #[test]
    fn encoded_thumbnail_keeps_alpha() {
        let thumb = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 0]));
        let png = encode_png(&thumb).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgba8);
    }
}
