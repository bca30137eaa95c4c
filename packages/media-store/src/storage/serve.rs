use std::fs;
use std::io;

use crate::config::StoreConfig;
use crate::errors::{MediaError, StorageError};
use crate::paths::{ensure_dir, TenantDirs};
use crate::storage::cache::CacheKey;
use crate::transform::{
    content_type_for_ext, decode_with_format, encode_image, fit_within, resize_image, OutputFormat,
};
use crate::validation::{clamp_dimension, clamp_quality, validate_filename};

/// 一度でもバイト列を返したレスポンスに付ける長期キャッシュヘッダ
pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// 配信リクエスト。数値パラメータは未検証のまま受け取り、内部で丸める。
#[derive(Debug, Clone, Default)]
pub struct ServeRequest {
    /// リクエストされた名前（`{id}` または `{id}.{ext}`、拡張子は出力フォーマット指定を兼ねる）
    pub name: String,
    /// メタデータストア側で解決済みの元ファイル名。無ければディスクから探索する。
    pub filename: Option<String>,
    /// メタデータ上の Content-Type（元ファイルをそのまま返す場合に使用）
    pub content_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub format: Option<String>,
    pub quality: Option<i64>,
}

#[derive(Debug)]
pub struct ServeReply {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: &'static str,
}

impl ServeReply {
    fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            cache_control: CACHE_CONTROL_IMMUTABLE,
        }
    }
}

/// 配信の状態機械:
/// 対象解決 → 元ファイル直接配信 → 生成済み兄弟配信 → キャッシュヒット → 生成してキャッシュ。
///
/// ファイルシステムの読み取りは常にプライマリ → レガシーの順で行う。
pub fn serve(
    config: &StoreConfig,
    tenant_key: &str,
    legacy_key: Option<&str>,
    req: &ServeRequest,
) -> Result<ServeReply, MediaError> {
    let dirs = TenantDirs::resolve(&config.upload_root, tenant_key, legacy_key)?;
    validate_filename(&req.name)?;

    // --- RESOLVE_TARGET ---
    let (base_id, requested_ext) = split_name(&req.name);
    let width = clamp_dimension(req.width);
    let height = clamp_dimension(req.height);
    let quality = clamp_quality(req.quality);
    let resize_requested = width.is_some() || height.is_some();

    let stored_filename = match &req.filename {
        Some(name) => {
            validate_filename(name)?;
            name.clone()
        }
        None => dirs
            .locate_original(base_id)
            .ok_or_else(|| StorageError::NotFound {
                name: req.name.clone(),
            })?,
    };
    let stored_ext = split_name(&stored_filename).1;
    let stored_format = stored_ext.and_then(OutputFormat::parse);

    // 明示の format パラメータ > リクエスト名の拡張子 > 保存時フォーマット。
    // 未知の指定はベースラインの JPEG に倒す（エラーにしない）。
    let target_format = match (&req.format, requested_ext) {
        (Some(f), _) => Some(OutputFormat::parse(f).unwrap_or(OutputFormat::Jpeg)),
        (None, Some(ext)) => Some(OutputFormat::parse(ext).unwrap_or(OutputFormat::Jpeg)),
        (None, None) => stored_format,
    };

    // --- TRY_STREAM_ORIGINAL ---
    if !resize_requested && target_format == stored_format {
        let bytes = dirs.read_first(&stored_filename)?;
        let content_type = req
            .content_type
            .clone()
            .unwrap_or_else(|| content_type_for_ext(stored_ext.unwrap_or("")).to_string());
        tracing::debug!(name = %stored_filename, "streaming original");
        return Ok(ServeReply::new(bytes, content_type));
    }

    let target = target_format.unwrap_or(OutputFormat::Jpeg);

    // --- TRY_PREBUILT_SIBLING ---
    if !resize_requested {
        let sibling = format!("{base_id}.{}", target.ext());
        match dirs.read_first(&sibling) {
            Ok(bytes) => {
                tracing::debug!(name = %sibling, "streaming prebuilt sibling");
                return Ok(ServeReply::new(bytes, target.content_type()));
            }
            Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    // --- TRY_CACHE_HIT ---
    let resolved_quality = quality.unwrap_or_else(|| target.default_quality());
    let key = CacheKey::new(base_id, width, height, resolved_quality, target);
    let cache_name = key.filename();
    for cache_dir in dirs.cache_candidates() {
        match fs::read(cache_dir.join(&cache_name)) {
            Ok(bytes) => {
                tracing::debug!(name = %cache_name, "transform cache hit");
                return Ok(ServeReply::new(bytes, target.content_type()));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(StorageError::Io(e).into()),
        }
    }

    // --- GENERATE_AND_CACHE ---
    let original = dirs.read_first(&stored_filename)?;
    let bytes = generate(&original, width, height, target, resolved_quality)?;

    let cache_dir = dirs.primary_cache();
    ensure_dir(&cache_dir).map_err(StorageError::Io)?;
    fs::write(cache_dir.join(&cache_name), &bytes).map_err(StorageError::Io)?;
    tracing::info!(name = %cache_name, size = bytes.len(), "generated transform");

    Ok(ServeReply::new(bytes, target.content_type()))
}

/// fit=inside・拡大なしでリサイズし、対象フォーマットへエンコードする。
fn generate(
    original: &[u8],
    width: Option<u32>,
    height: Option<u32>,
    target: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, MediaError> {
    let (img, _) = decode_with_format(original)?;
    let (dst_w, dst_h) = fit_within(img.width(), img.height(), width, height);
    let img = if (dst_w, dst_h) == (img.width(), img.height()) {
        img
    } else {
        resize_image(&img, dst_w, dst_h)?
    };
    Ok(encode_image(&img, target, quality)?)
}

/// `{stem}.{ext}` を分解する。拡張子が無ければ全体を stem とする。
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
