//! Image codec capability.
//!
//! The pipeline only ever asks a codec for three things: resize, encode to a
//! target format, and recompress an encoded payload. `RasterCodec` implements
//! them off the async runtime: `image` decodes, resizes and writes JPEG and
//! lossless PNG, `imagequant` builds palettes for PNG recompression and
//! `webp` writes lossy WebP.

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use prism_core::ImageFormat;
use prism_core::config::{CodecConfig, ResizeFilter};
use std::io::Cursor;

/// Codec failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode {format}: {message}")]
    Encode {
        format: ImageFormat,
        message: String,
    },

    #[error("codec task failed: {0}")]
    Task(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Image operations used by the transform step.
#[async_trait]
pub trait ImageCodec: Send + Sync + 'static {
    /// Resize to the given bounds.
    ///
    /// With both axes the image is scaled to cover the box and center-cropped;
    /// with one axis it is scaled proportionally. Output is an intermediate
    /// lossless payload suitable for `encode`.
    async fn resize(
        &self,
        data: Bytes,
        width: Option<u32>,
        height: Option<u32>,
    ) -> CodecResult<Bytes>;

    /// Encode any decodable payload into `format`.
    async fn encode(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes>;

    /// Re-encode a payload of `format` to shrink it.
    async fn recompress(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes>;
}

/// Native-library implementation of [`ImageCodec`].
#[derive(Clone, Debug)]
pub struct RasterCodec {
    jpeg_quality: u8,
    recompress_jpeg_quality: u8,
    webp_quality: u8,
    png_quality: (u8, u8),
    filter: FilterType,
}

impl RasterCodec {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            recompress_jpeg_quality: config.recompress_jpeg_quality,
            webp_quality: config.webp_quality,
            png_quality: (config.png_quality_min, config.png_quality_max),
            filter: filter_type(config.resize_filter),
        }
    }
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Gaussian => FilterType::Gaussian,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

async fn blocking<F>(f: F) -> CodecResult<Bytes>
where
    F: FnOnce() -> CodecResult<Bytes> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CodecError::Task(e.to_string()))?
}

fn decode(data: &[u8]) -> CodecResult<DynamicImage> {
    image::load_from_memory(data).map_err(|e| CodecError::Decode(e.to_string()))
}

fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
    webp_quality: u8,
) -> CodecResult<Bytes> {
    let encode_err = |e: image::ImageError| CodecError::Encode {
        format,
        message: e.to_string(),
    };
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality))
                .map_err(encode_err)?;
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        ImageFormat::Webp => return encode_webp(img, webp_quality),
    }
    Ok(Bytes::from(buf))
}

/// Lossy WebP at `quality`, keeping alpha when the source has it.
fn encode_webp(img: &DynamicImage, quality: u8) -> CodecResult<Bytes> {
    let (width, height) = (img.width(), img.height());
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, f32::from(quality))
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, f32::from(quality))
    };
    let memory = encoded.map_err(|e| CodecError::Encode {
        format: ImageFormat::Webp,
        message: format!("{e:?}"),
    })?;
    Ok(Bytes::copy_from_slice(&memory))
}

/// Quantize to a palette of at most 256 colors and write an indexed PNG.
///
/// Returns `None` when the palette cannot reach `min_quality`; the caller
/// keeps its input in that case.
fn quantize_png(
    img: &DynamicImage,
    (min_quality, max_quality): (u8, u8),
) -> CodecResult<Option<Bytes>> {
    let quant_err = |e: imagequant::Error| CodecError::Encode {
        format: ImageFormat::Png,
        message: e.to_string(),
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels: Vec<imagequant::RGBA> = rgba
        .pixels()
        .map(|p| imagequant::RGBA::new(p[0], p[1], p[2], p[3]))
        .collect();

    let mut liq = imagequant::new();
    liq.set_quality(min_quality, max_quality).map_err(quant_err)?;
    let mut image = liq
        .new_image(pixels, width as usize, height as usize, 0.0)
        .map_err(quant_err)?;
    let mut quantized = match liq.quantize(&mut image) {
        Ok(quantized) => quantized,
        Err(imagequant::Error::QualityTooLow) => return Ok(None),
        Err(e) => return Err(quant_err(e)),
    };
    quantized.set_dithering_level(1.0).map_err(quant_err)?;
    let (palette, indices) = quantized.remapped(&mut image).map_err(quant_err)?;

    let rgb_palette: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    let alpha: Vec<u8> = palette.iter().map(|c| c.a).collect();

    let png_err = |e: png::EncodingError| CodecError::Encode {
        format: ImageFormat::Png,
        message: e.to_string(),
    };
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_palette(rgb_palette);
        if alpha.iter().any(|&a| a < u8::MAX) {
            encoder.set_trns(alpha);
        }
        let mut writer = encoder.write_header().map_err(png_err)?;
        writer.write_image_data(&indices).map_err(png_err)?;
        writer.finish().map_err(png_err)?;
    }
    Ok(Some(Bytes::from(buf)))
}

#[async_trait]
impl ImageCodec for RasterCodec {
    async fn resize(
        &self,
        data: Bytes,
        width: Option<u32>,
        height: Option<u32>,
    ) -> CodecResult<Bytes> {
        let filter = self.filter;
        blocking(move || {
            let img = decode(&data)?;
            let resized = match (width, height) {
                (Some(w), Some(h)) => img.resize_to_fill(w, h, filter),
                (Some(w), None) => img.resize(w, u32::MAX, filter),
                (None, Some(h)) => img.resize(u32::MAX, h, filter),
                (None, None) => img,
            };
            let mut buf = Cursor::new(Vec::new());
            resized
                .write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| CodecError::Encode {
                    format: ImageFormat::Png,
                    message: e.to_string(),
                })?;
            Ok(Bytes::from(buf.into_inner()))
        })
        .await
    }

    async fn encode(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes> {
        let (jpeg_quality, webp_quality) = (self.jpeg_quality, self.webp_quality);
        blocking(move || encode_image(&decode(&data)?, format, jpeg_quality, webp_quality)).await
    }

    async fn recompress(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes> {
        match format {
            // Already lossy at the configured quality.
            ImageFormat::Webp => Ok(data),
            ImageFormat::Jpeg => {
                let quality = self.recompress_jpeg_quality;
                blocking(move || encode_image(&decode(&data)?, format, quality, quality)).await
            }
            ImageFormat::Png => {
                let range = self.png_quality;
                blocking(move || match quantize_png(&decode(&data)?, range)? {
                    Some(quantized) if quantized.len() < data.len() => Ok(quantized),
                    _ => {
                        tracing::debug!(
                            size = data.len(),
                            "palette did not shrink png, keeping input"
                        );
                        Ok(data)
                    }
                })
                .await
            }
        }
    }
}
