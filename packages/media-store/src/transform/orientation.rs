use image::DynamicImage;

/// EXIF Orientation タグ（値 1-8）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// EXIF タグ値から変換する。範囲外は Normal 扱い。
    pub fn from_exif_value(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// 画像に回転・反転を適用してピクセルに焼き込む。
    ///
    /// 再エンコードで EXIF は失われるため、アップロード時に一度だけ適用する。
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::FlipHorizontal => img.fliph(),
            Self::Rotate180 => img.rotate180(),
            Self::FlipVertical => img.flipv(),
            Self::Transpose => img.rotate90().fliph(),
            Self::Rotate90 => img.rotate90(),
            Self::Transverse => img.rotate270().fliph(),
            Self::Rotate270 => img.rotate270(),
        }
    }
}

/// バイト列から EXIF Orientation を読み取る。EXIF がない・読めない場合は Normal。
pub fn detect_orientation(data: &[u8]) -> Orientation {
    let mut cursor = std::io::Cursor::new(data);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from_exif_value)
        .unwrap_or_default()
}
