use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::StoreConfig;
use crate::constants::{DEFAULT_QUALITY, MAX_PLACEHOLDER_WIDTH};
use crate::errors::{MediaError, StorageError};
use crate::hash::content_hash16;
use crate::paths::{ensure_dir, TenantDirs};
use crate::transform::{
    decode_with_format, detect_orientation, optimize_original, placeholder, resize_image,
    shrink_to_max, webp_copy, OutputFormat,
};

/// アップロード時に生成される兄弟アーティファクト
#[derive(Debug, Clone, Serialize)]
pub struct FileVariant {
    pub label: String,
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size_bytes: u64,
}

/// `store` の結果。メタデータストアへの登録は呼び出し側の責務。
#[derive(Debug, Serialize)]
pub struct StoredFile {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub variants: Vec<FileVariant>,
    /// ベストエフォートな派生処理の失敗（本体の保存は成功している）
    pub warnings: Vec<String>,
}

/// バイト列をテナント配下に保存し、画像なら派生アーティファクトを生成する。
///
/// 本体バイト列の保存は画像処理の失敗では決して失敗しない。
/// 派生処理（最適化・WebP 兄弟・プレースホルダ）は個別にベストエフォートで、
/// 失敗はログと `warnings` に記録して該当アーティファクトを省略する。
pub fn save_file(
    config: &StoreConfig,
    data: &[u8],
    original_name: &str,
    tenant_key: &str,
    content_type: &str,
) -> Result<StoredFile, MediaError> {
    let dirs = TenantDirs::resolve(&config.upload_root, tenant_key, None)?;

    let id = content_hash16(data);
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());
    let filename = match &ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.clone(),
    };

    ensure_dir(dirs.primary()).map_err(StorageError::Io)?;
    let file_path = dirs.primary().join(&filename);
    fs::write(&file_path, data).map_err(StorageError::Io)?;

    let mut result = StoredFile {
        id,
        filename,
        original_name: original_name.to_string(),
        content_type: content_type.to_string(),
        size_bytes: data.len() as u64,
        width: None,
        height: None,
        variants: Vec::new(),
        warnings: Vec::new(),
    };

    if content_type.starts_with("image/") {
        enrich_image(config, dirs.primary(), data, &mut result);
    }

    tracing::info!(
        id = %result.id,
        tenant = %tenant_key,
        size = result.size_bytes,
        variants = result.variants.len(),
        "stored file"
    );
    Ok(result)
}

/// 画像固有の派生処理。デコード失敗は警告のみで、保存済みバイト列はそのまま残る。
fn enrich_image(config: &StoreConfig, dir: &Path, data: &[u8], result: &mut StoredFile) {
    let (img, source_format) = match decode_with_format(data) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn_step(result, "decode", &e.to_string());
            return;
        }
    };

    // EXIF Orientation をピクセルに焼き込む（再エンコードでタグは消えるため）
    let orientation = detect_orientation(data);
    let mut img = if orientation.is_normal() {
        img
    } else {
        orientation.apply(img)
    };
    result.width = Some(img.width());
    result.height = Some(img.height());

    let format = source_format.and_then(OutputFormat::from_image_format);
    let Some(format) = format.filter(OutputFormat::is_enrichable) else {
        // GIF やデコード可能なだけの未知フォーマットは無加工で通す
        return;
    };

    // 過大な元画像は保存前に縮小する
    if let Some((w, h)) = shrink_to_max(img.width(), img.height(), config.original_max_dim) {
        match resize_image(&img, w, h) {
            Ok(resized) => {
                img = resized;
                result.width = Some(w);
                result.height = Some(h);
            }
            Err(e) => warn_step(result, "downscale", &e.to_string()),
        }
    }

    // 元フォーマットのまま最適化して上書き
    match optimize_original(&img, format) {
        Ok(optimized) => match fs::write(dir.join(&result.filename), &optimized) {
            Ok(()) => result.size_bytes = optimized.len() as u64,
            Err(e) => warn_step(result, "optimize", &e.to_string()),
        },
        Err(e) => warn_step(result, "optimize", &e.to_string()),
    }

    // 同寸法の WebP 兄弟（元が WebP なら不要）
    if format != OutputFormat::WebP {
        let webp_name = format!("{}.webp", result.id);
        match webp_copy(&img, DEFAULT_QUALITY)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                fs::write(dir.join(&webp_name), &bytes).map_err(|e| e.to_string())?;
                Ok(bytes.len() as u64)
            }) {
            Ok(size_bytes) => result.variants.push(FileVariant {
                label: "webp".to_string(),
                filename: webp_name,
                width: Some(img.width()),
                height: Some(img.height()),
                size_bytes,
            }),
            Err(e) => warn_step(result, "webp", &e),
        }
    }

    // ぼかしプレースホルダ（元フォーマット + WebP）
    let ph_width = config.placeholder_width.min(MAX_PLACEHOLDER_WIDTH);
    let mut targets = vec![("placeholder", format)];
    if format != OutputFormat::WebP {
        targets.push(("placeholder-webp", OutputFormat::WebP));
    }
    for (label, target) in targets {
        let ph_name = format!("{}-placeholder.{}", result.id, target.ext());
        match placeholder(&img, target, ph_width, config.placeholder_quality)
            .map_err(|e| e.to_string())
            .and_then(|(bytes, w, h)| {
                fs::write(dir.join(&ph_name), &bytes).map_err(|e| e.to_string())?;
                Ok((bytes.len() as u64, w, h))
            }) {
            Ok((size_bytes, w, h)) => result.variants.push(FileVariant {
                label: label.to_string(),
                filename: ph_name,
                width: Some(w),
                height: Some(h),
                size_bytes,
            }),
            Err(e) => warn_step(result, label, &e),
        }
    }
}

fn warn_step(result: &mut StoredFile, step: &str, error: &str) {
    tracing::warn!(id = %result.id, step = %step, error = %error, "image enrichment step failed");
    result.warnings.push(format!("{step}: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::encode_image;
    use image::DynamicImage;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> StoreConfig {
        StoreConfig::new(root)
    }

    fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
        encode_image(&DynamicImage::new_rgb8(w, h), OutputFormat::Jpeg, 90).unwrap()
    }

    #[test]
    fn test_save_jpeg_produces_siblings() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let data = jpeg_bytes(640, 320);

        let stored = save_file(&config, &data, "photo.JPG", "my-app", "image/jpeg").unwrap();

        assert_eq!(stored.id.len(), 16);
        assert_eq!(stored.filename, format!("{}.jpg", stored.id));
        assert_eq!(stored.width, Some(640));
        assert_eq!(stored.height, Some(320));
        assert!(stored.warnings.is_empty());

        let labels: Vec<_> = stored.variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["webp", "placeholder", "placeholder-webp"]);

        let dir = root.path().join("my-app");
        assert!(dir.join(&stored.filename).is_file());
        for variant in &stored.variants {
            assert!(dir.join(&variant.filename).is_file());
        }
    }

    #[test]
    fn test_webp_upload_skips_webp_sibling() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let data = encode_image(&DynamicImage::new_rgb8(50, 50), OutputFormat::WebP, 80).unwrap();

        let stored = save_file(&config, &data, "pic.webp", "my-app", "image/webp").unwrap();

        let labels: Vec<_> = stored.variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["placeholder"]);
    }

    #[test]
    fn test_oversized_original_is_downscaled() {
        let root = TempDir::new().unwrap();
        let mut config = test_config(root.path());
        config.original_max_dim = 100;
        let data = jpeg_bytes(400, 200);

        let stored = save_file(&config, &data, "big.jpg", "my-app", "image/jpeg").unwrap();
        assert_eq!(stored.width, Some(100));
        assert_eq!(stored.height, Some(50));
        // 保存された本体も縮小済み
        let on_disk = fs::read(root.path().join("my-app").join(&stored.filename)).unwrap();
        let meta = crate::transform::read_metadata(&on_disk).unwrap();
        assert_eq!((meta.width, meta.height), (100, 50));
    }

    #[test]
    fn test_corrupt_image_still_stores_bytes() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let data = b"not really a png".to_vec();

        let stored = save_file(&config, &data, "broken.png", "my-app", "image/png").unwrap();

        assert!(stored.variants.is_empty());
        assert!(!stored.warnings.is_empty());
        assert_eq!(
            fs::read(root.path().join("my-app").join(&stored.filename)).unwrap(),
            data
        );
    }

    #[test]
    fn test_non_image_content_type_skips_enrichment() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        let stored = save_file(&config, b"%PDF-1.4", "doc.pdf", "my-app", "application/pdf").unwrap();
        assert!(stored.variants.is_empty());
        assert!(stored.warnings.is_empty());
        assert_eq!(stored.width, None);
    }

    #[test]
    fn test_same_bytes_same_id() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let data = jpeg_bytes(30, 30);

        let first = save_file(&config, &data, "a.jpg", "my-app", "image/jpeg").unwrap();
        let second = save_file(&config, &data, "b.jpg", "my-app", "image/jpeg").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.filename, second.filename);
    }
}
