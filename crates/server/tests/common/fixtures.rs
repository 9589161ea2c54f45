//! Image fixtures.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// A PNG of the given size.
#[allow(dead_code)]
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png fixture");
    Bytes::from(buf.into_inner())
}

/// A JPEG of the given size.
#[allow(dead_code)]
pub fn jpeg_bytes(width: u32, height: u32) -> Bytes {
    let mut buf = Vec::new();
    gradient(width, height)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .expect("encode jpeg fixture");
    Bytes::from(buf)
}

/// Decoded `(width, height)` of an encoded image.
#[allow(dead_code)]
pub fn dimensions(data: &[u8]) -> (u32, u32) {
    image::load_from_memory(data)
        .expect("decode image")
        .dimensions()
}

/// Detected container format of an encoded image.
#[allow(dead_code)]
pub fn sniff(data: &[u8]) -> image::ImageFormat {
    image::guess_format(data).expect("guess format")
}
