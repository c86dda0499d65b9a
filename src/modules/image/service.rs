use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use tracing::info;

use super::dto::{ImageCompressOptions, ImageCompressResponse};
use super::error::{ImageError, ImageResult};

/// Single-frame output codecs.
#[derive(Debug, Clone, Copy)]
pub enum StillEncoding {
    Jpeg { quality: u8 },
    Png(CompressionType),
    WebpLossless,
}

/// How an upload is written back out.
#[derive(Debug, Clone, Copy)]
pub enum Encoding {
    Still(StillEncoding),
    /// Every frame is decoded and re-encoded.
    AnimatedGif,
}

impl Encoding {
    pub fn for_input(format: ImageFormat, quality: u8) -> Self {
        let still = match format {
            ImageFormat::Gif => return Encoding::AnimatedGif,
            ImageFormat::Jpeg => StillEncoding::Jpeg { quality },
            ImageFormat::Png => StillEncoding::Png(png_compression(quality)),
            ImageFormat::Tiff if quality > 90 => StillEncoding::Png(CompressionType::Best),
            ImageFormat::Tiff => StillEncoding::Jpeg { quality },
            _ => StillEncoding::WebpLossless,
        };
        Encoding::Still(still)
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            Encoding::Still(StillEncoding::Jpeg { .. }) => "jpeg",
            Encoding::Still(StillEncoding::Png(_)) => "png",
            Encoding::Still(StillEncoding::WebpLossless) => "webp",
            Encoding::AnimatedGif => "gif",
        }
    }
}

/// Lower quality trades encode time for smaller PNGs.
pub fn png_compression(quality: u8) -> CompressionType {
    match 100u8.saturating_sub(quality) / 10 {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| format!("{:?}", other).to_lowercase()),
    }
}

#[derive(Debug)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub original_format: String,
    pub output_format: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Decodes `input`, picks an output encoding from its format and re-encodes it.
pub fn compress_image(input: &[u8], quality: u8) -> ImageResult<CompressedImage> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(image::ImageError::IoError(e)))?;
    let format = reader.format().ok_or(ImageError::UnsupportedFormat)?;
    let encoding = Encoding::for_input(format, quality);

    let (bytes, width, height) = match encoding {
        Encoding::AnimatedGif => reencode_gif(input)?,
        Encoding::Still(still) => {
            let img = reader.decode().map_err(ImageError::Decode)?;
            (encode(&img, still)?, img.width(), img.height())
        }
    };

    Ok(CompressedImage {
        bytes,
        original_format: format_name(format),
        output_format: encoding.format_name(),
        width,
        height,
    })
}

fn encode(img: &DynamicImage, encoding: StillEncoding) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();

    match encoding {
        StillEncoding::Jpeg { quality } => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality)),
        StillEncoding::Png(compression) => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut buf,
            compression,
            FilterType::Adaptive,
        )),
        StillEncoding::WebpLossless => {
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            img.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        }
    }
    .map_err(ImageError::Encode)?;

    Ok(buf)
}

/// Re-encodes every frame so animations survive.
fn reencode_gif(input: &[u8]) -> ImageResult<(Vec<u8>, u32, u32)> {
    let decoder = GifDecoder::new(Cursor::new(input)).map_err(ImageError::Decode)?;
    let (width, height) = decoder.dimensions();
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(ImageError::Decode)?;

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(ImageError::Encode)?;
        encoder.encode_frames(frames).map_err(ImageError::Encode)?;
    }

    Ok((buf, width, height))
}

/// Percentage of bytes saved, two decimals.
pub fn compression_ratio(original: usize, compressed: usize) -> String {
    if original == 0 {
        return "0.00%".to_string();
    }
    let saved = (original as f64 - compressed as f64) / original as f64 * 100.0;
    format!("{:.2}%", saved)
}

pub struct ImageService;

impl ImageService {
    pub async fn compress(
        upload: Bytes,
        options: ImageCompressOptions,
    ) -> ImageResult<ImageCompressResponse> {
        let original_size = upload.len();
        let compressed = tokio::task::spawn_blocking(move || compress_image(&upload, options.quality))
            .await
            .map_err(|e| ImageError::Worker(e.to_string()))??;

        let ratio = compression_ratio(original_size, compressed.bytes.len());
        info!(
            "Compressed {} image to {}: {} -> {} bytes ({})",
            compressed.original_format,
            compressed.output_format,
            original_size,
            compressed.bytes.len(),
            ratio
        );

        Ok(ImageCompressResponse {
            compressed_image: format!(
                "data:image/{};base64,{}",
                compressed.output_format,
                STANDARD.encode(&compressed.bytes)
            ),
            size: compressed.bytes.len(),
            original_format: compressed.original_format,
            output_format: compressed.output_format.to_string(),
            width: compressed.width,
            height: compressed.height,
            compression_ratio: ratio,
        })
    }
}
