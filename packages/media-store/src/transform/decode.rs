use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::errors::TransformError;

/// デコードせずに読み取れる画像メタデータ
#[derive(Debug, Clone, Copy)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

/// ヘッダのみから寸法とフォーマットを読み取る。
///
/// 破損・未対応フォーマットは `Decode` エラー。
pub fn read_metadata(data: &[u8]) -> Result<ImageMeta, TransformError> {
    let reader = guessed_reader(data)?;
    let format = reader.format();
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    Ok(ImageMeta {
        width,
        height,
        format,
    })
}

/// フル デコードし、検出した元フォーマットも返す
pub fn decode_with_format(
    data: &[u8],
) -> Result<(DynamicImage, Option<ImageFormat>), TransformError> {
    let reader = guessed_reader(data)?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    Ok((img, format))
}

fn guessed_reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(format!("failed to guess format: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::encode_image;
    use crate::transform::params::OutputFormat;

    #[test]
    fn test_read_metadata_of_png() {
        let img = DynamicImage::new_rgb8(20, 10);
        let data = encode_image(&img, OutputFormat::Png, 80).unwrap();

        let meta = read_metadata(&data).unwrap();
        assert_eq!(meta.width, 20);
        assert_eq!(meta.height, 10);
        assert_eq!(meta.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_corrupt_input_is_decode_error() {
        let result = read_metadata(b"definitely not an image");
        assert!(matches!(result, Err(TransformError::Decode(_))));

        let result = decode_with_format(&[0xFF, 0xD8, 0x00]);
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_decode_returns_source_format() {
        let img = DynamicImage::new_rgb8(4, 4);
        let data = encode_image(&img, OutputFormat::Jpeg, 80).unwrap();

        let (decoded, format) = decode_with_format(&data).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(format, Some(ImageFormat::Jpeg));
    }
}
