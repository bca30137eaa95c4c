/// 変換後画像の最大寸法（幅・高さ）
pub const MAX_DIMENSION: u32 = 4096;

/// アップロード時に元画像を縮小する際のデフォルト上限
pub const DEFAULT_ORIGINAL_MAX_DIM: u32 = 2560;

/// アップロード時最適化のデフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 80;

/// プレースホルダのデフォルト幅
pub const DEFAULT_PLACEHOLDER_WIDTH: u32 = 24;

/// プレースホルダ幅の上限
pub const MAX_PLACEHOLDER_WIDTH: u32 = 360;

/// プレースホルダのデフォルト品質
pub const DEFAULT_PLACEHOLDER_QUALITY: u8 = 60;

/// プレースホルダのぼかし強度（ガウシアン sigma）
pub const PLACEHOLDER_BLUR_SIGMA: f32 = 8.0;

/// コンテンツハッシュ ID の16進文字数
pub const HASH_HEX_LEN: usize = 16;

/// 変換キャッシュ用サブディレクトリ名
pub const CACHE_DIR_NAME: &str = "_cache";
