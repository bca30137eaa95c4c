use image::DynamicImage;

use crate::constants::{DEFAULT_QUALITY, PLACEHOLDER_BLUR_SIGMA};
use crate::errors::TransformError;
use crate::transform::dimensions::fit_within;
use crate::transform::encode::encode_image;
use crate::transform::params::OutputFormat;
use crate::transform::resize::resize_image;

/// 元フォーマットのまま再エンコードして容量を削減する。
pub fn optimize_original(
    img: &DynamicImage,
    format: OutputFormat,
) -> Result<Vec<u8>, TransformError> {
    encode_image(img, format, DEFAULT_QUALITY)
}

/// 同寸法の WebP 兄弟を生成する。
pub fn webp_copy(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    encode_image(img, OutputFormat::WebP, quality)
}

/// 低帯域プレビュー用の小さなぼかし画像を生成する。
///
/// fit=inside で `width` 四方に縮小してからぼかし、低品質でエンコードする。
/// (バイト列, 幅, 高さ) を返す。
pub fn placeholder(
    img: &DynamicImage,
    format: OutputFormat,
    width: u32,
    quality: u8,
) -> Result<(Vec<u8>, u32, u32), TransformError> {
    let (w, h) = fit_within(img.width(), img.height(), Some(width), Some(width));
    let small = if (w, h) == (img.width(), img.height()) {
        img.clone()
    } else {
        resize_image(img, w, h)?
    };
    let blurred = small.blur(PLACEHOLDER_BLUR_SIGMA);
    let data = encode_image(&blurred, format, quality)?;
    Ok((data, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::decode::read_metadata;

    #[test]
    fn test_optimize_keeps_format() {
        let img = DynamicImage::new_rgb8(32, 32);
        let data = optimize_original(&img, OutputFormat::Jpeg).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_webp_copy_keeps_dimensions() {
        let img = DynamicImage::new_rgb8(40, 30);
        let data = webp_copy(&img, 80).unwrap();
        let meta = read_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (40, 30));
    }

    #[test]
    fn test_placeholder_is_small() {
        let img = DynamicImage::new_rgb8(2000, 1000);
        let (data, w, h) = placeholder(&img, OutputFormat::Jpeg, 24, 60).unwrap();
        assert_eq!((w, h), (24, 12));
        let meta = read_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (24, 12));
    }

    #[test]
    fn test_placeholder_never_upscales_tiny_source() {
        let img = DynamicImage::new_rgb8(10, 8);
        let (_, w, h) = placeholder(&img, OutputFormat::Png, 24, 60).unwrap();
        assert_eq!((w, h), (10, 8));
    }
}
