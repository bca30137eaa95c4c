use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_ORIGINAL_MAX_DIM, DEFAULT_PLACEHOLDER_QUALITY, DEFAULT_PLACEHOLDER_WIDTH,
    MAX_PLACEHOLDER_WIDTH,
};

/// ストレージエンジンの設定。
///
/// プロセス起動時に一度だけ構築して [`crate::MediaStore`] に渡す。
/// 環境変数をコード中に散らさないため、参照は全てこの構造体経由で行う。
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// 全テナントディレクトリの親ディレクトリ
    pub upload_root: PathBuf,
    /// アップロード時に元画像を縮小する寸法上限
    pub original_max_dim: u32,
    /// プレースホルダの幅
    pub placeholder_width: u32,
    /// プレースホルダのエンコード品質
    pub placeholder_quality: u8,
}

impl StoreConfig {
    pub fn new(upload_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: absolutize(upload_root.into()),
            original_max_dim: DEFAULT_ORIGINAL_MAX_DIM,
            placeholder_width: DEFAULT_PLACEHOLDER_WIDTH,
            placeholder_quality: DEFAULT_PLACEHOLDER_QUALITY,
        }
    }

    /// 環境変数から設定を組み立てる。
    ///
    /// 参照する環境変数（いずれも省略可）:
    /// - UPLOAD_DIR（デフォルト "uploads"）
    /// - ORIGINAL_MAX_DIM
    /// - PLACEHOLDER_WIDTH
    /// - PLACEHOLDER_QUALITY
    pub fn from_env() -> Self {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let mut config = Self::new(root);

        if let Some(dim) = env_u32("ORIGINAL_MAX_DIM") {
            config.original_max_dim = dim;
        }
        if let Some(width) = env_u32("PLACEHOLDER_WIDTH") {
            config.placeholder_width = width.min(MAX_PLACEHOLDER_WIDTH);
        }
        if let Some(quality) = env_u32("PLACEHOLDER_QUALITY") {
            config.placeholder_quality = quality.clamp(1, 100) as u8;
        }
        config
    }
}

fn absolutize(dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| Path::new(".").to_path_buf())
            .join(dir)
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok()?.parse().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = StoreConfig::new("/srv/uploads");
        assert_eq!(config.upload_root, PathBuf::from("/srv/uploads"));
        assert_eq!(config.original_max_dim, DEFAULT_ORIGINAL_MAX_DIM);
        assert_eq!(config.placeholder_width, DEFAULT_PLACEHOLDER_WIDTH);
        assert_eq!(config.placeholder_quality, DEFAULT_PLACEHOLDER_QUALITY);
    }

    #[test]
    fn test_relative_root_becomes_absolute() {
        let config = StoreConfig::new("uploads");
        assert!(config.upload_root.is_absolute());
        assert!(config.upload_root.ends_with("uploads"));
    }
}
