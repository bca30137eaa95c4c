use std::io::Cursor;

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;

use crate::errors::TransformError;
use crate::transform::params::OutputFormat;

/// 画像を指定フォーマット・品質でエンコードする。
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            // JPEG はアルファ非対応のため RGB に落とす
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::Encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            // PNG に品質の概念はないため、圧縮率重視の設定でエンコードする
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::Encode(format!("png: {e}")))?;
        }
        OutputFormat::WebP => {
            // image クレートの WebP エンコーダはロスレスのみ（quality は無視される）
            let encoder = WebPEncoder::new_lossless(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::Encode(format!("webp: {e}")))?;
        }
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut buf, 4, quality);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::Encode(format!("avif: {e}")))?;
        }
    }

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_magic() {
        let img = DynamicImage::new_rgb8(8, 8);
        let data = encode_image(&img, OutputFormat::Jpeg, 80).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = DynamicImage::new_rgba8(8, 8);
        assert!(encode_image(&img, OutputFormat::Jpeg, 80).is_ok());
    }

    #[test]
    fn test_encode_png_magic() {
        let img = DynamicImage::new_rgb8(8, 8);
        let data = encode_image(&img, OutputFormat::Png, 80).unwrap();
        assert_eq!(&data[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_webp_is_riff_container() {
        let img = DynamicImage::new_rgb8(8, 8);
        let data = encode_image(&img, OutputFormat::WebP, 80).unwrap();
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_avif() {
        let img = DynamicImage::new_rgb8(8, 8);
        let data = encode_image(&img, OutputFormat::Avif, 50).unwrap();
        assert!(!data.is_empty());
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        // グラデーションでないと品質差が出ないため単色は避ける
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(64, 64, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        }));
        let high = encode_image(&img, OutputFormat::Jpeg, 95).unwrap();
        let low = encode_image(&img, OutputFormat::Jpeg, 20).unwrap();
        assert!(low.len() < high.len());
    }
}
