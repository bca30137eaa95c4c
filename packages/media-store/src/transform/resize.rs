use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;

use crate::errors::TransformError;

/// 画像をリサイズする。
///
/// fast_image_resize の Lanczos3 コンボリューションを使用。
/// アルファチャンネルを持つ画像は RGBA のまま処理して透過を保持する。
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = (rgba.width(), rgba.height());
        let resized = resize_plane(w, h, rgba.into_raw(), PixelType::U8x4, target_w, target_h)?;
        let buf = image::RgbaImage::from_raw(target_w, target_h, resized)
            .ok_or_else(|| TransformError::Encode("resized rgba buffer size mismatch".into()))?;
        Ok(DynamicImage::ImageRgba8(buf))
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = (rgb.width(), rgb.height());
        let resized = resize_plane(w, h, rgb.into_raw(), PixelType::U8x3, target_w, target_h)?;
        let buf = image::RgbImage::from_raw(target_w, target_h, resized)
            .ok_or_else(|| TransformError::Encode("resized rgb buffer size mismatch".into()))?;
        Ok(DynamicImage::ImageRgb8(buf))
    }
}

fn resize_plane(
    src_w: u32,
    src_h: u32,
    pixels: Vec<u8>,
    pixel_type: PixelType,
    target_w: u32,
    target_h: u32,
) -> Result<Vec<u8>, TransformError> {
    let src = Image::from_vec_u8(src_w, src_h, pixels, pixel_type)
        .map_err(|e| TransformError::Encode(format!("failed to wrap source image: {e}")))?;
    let mut dst = Image::new(target_w, target_h, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src,
            &mut dst,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| TransformError::Encode(format!("resize failed: {e}")))?;

    Ok(dst.into_vec())
}
