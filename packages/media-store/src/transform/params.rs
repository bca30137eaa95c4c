use image::ImageFormat;

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
}

impl OutputFormat {
    /// フォーマット指定文字列・拡張子から変換する
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// デコーダが検出したフォーマットから変換する
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            ImageFormat::Avif => Some(Self::Avif),
            _ => None,
        }
    }

    /// キャッシュファイル名等に使う正規化済み拡張子
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }

    /// 配信時のフォーマット別デフォルト品質
    pub fn default_quality(&self) -> u8 {
        match self {
            Self::Jpeg => 85,
            Self::Png => 80,
            Self::WebP => 80,
            Self::Avif => 50,
        }
    }

    /// アップロード時エンリッチの対象となる正規化ラスタフォーマットか。
    ///
    /// GIF はアニメーションが失われるため再エンコードしない。
    /// AVIF はデコード非対応のため対象外。
    pub fn is_enrichable(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::WebP)
    }
}

/// 拡張子から Content-Type を引く（元ファイルをそのまま配信する場合用）
pub fn content_type_for_ext(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!(OutputFormat::parse("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::parse("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::parse("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::parse("avif"), Some(OutputFormat::Avif));
        assert_eq!(OutputFormat::parse("bmp"), None);
    }

    #[test]
    fn test_jpeg_and_jpg_normalize_to_same_ext() {
        assert_eq!(OutputFormat::parse("jpeg").unwrap().ext(), "jpg");
        assert_eq!(OutputFormat::parse("jpg").unwrap().ext(), "jpg");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(OutputFormat::Avif.content_type(), "image/avif");
        assert_eq!(content_type_for_ext("JPEG"), "image/jpeg");
        assert_eq!(content_type_for_ext("pdf"), "application/octet-stream");
    }

    #[test]
    fn test_enrichable_formats() {
        assert!(OutputFormat::Jpeg.is_enrichable());
        assert!(OutputFormat::Png.is_enrichable());
        assert!(OutputFormat::WebP.is_enrichable());
        assert!(!OutputFormat::Avif.is_enrichable());
    }
}
