use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::errors::StorageError;
use crate::paths::TenantDirs;
use crate::transform::params::OutputFormat;

/// 変換キャッシュのキー。
///
/// `filename()` は解決済みパラメータからの単射写像:
/// `{base}[_w{w}][_h{h}]_q{q}.{ext}`。
/// base は16進のみ（`_` を含まない）ため区切りと衝突しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    base: String,
    width: Option<u32>,
    height: Option<u32>,
    quality: u8,
    format: OutputFormat,
}

impl CacheKey {
    pub fn new(
        base: impl Into<String>,
        width: Option<u32>,
        height: Option<u32>,
        quality: u8,
        format: OutputFormat,
    ) -> Self {
        Self {
            base: base.into(),
            width,
            height,
            quality,
            format,
        }
    }

    pub fn filename(&self) -> String {
        let mut name = self.base.clone();
        if let Some(w) = self.width {
            name.push_str(&format!("_w{w}"));
        }
        if let Some(h) = self.height {
            name.push_str(&format!("_h{h}"));
        }
        name.push_str(&format!("_q{}", self.quality));
        name.push('.');
        name.push_str(self.format.ext());
        name
    }
}

/// キャッシュディレクトリの1エントリ
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub name: String,
    pub size_bytes: u64,
    pub mtime_ms: Option<u64>,
}

#[derive(Debug, Default, Serialize)]
pub struct CacheListing {
    pub items: Vec<CacheEntry>,
    pub total_bytes: u64,
}

/// プライマリ・レガシー両方のキャッシュディレクトリを列挙する。
pub fn list_cache(dirs: &TenantDirs) -> Result<CacheListing, StorageError> {
    let mut listing = CacheListing::default();
    for cache_dir in dirs.cache_candidates() {
        listing.items.extend(list_dir(&cache_dir)?);
    }
    listing.total_bytes = listing.items.iter().map(|e| e.size_bytes).sum();
    Ok(listing)
}

/// 両キャッシュディレクトリを削除し、解放したバイト数を返す。
///
/// バイト数は削除前に集計する。存在しないディレクトリは0バイトとして扱う。
pub fn clear_cache(dirs: &TenantDirs) -> Result<u64, StorageError> {
    let cleared = list_cache(dirs)?.total_bytes;
    for cache_dir in dirs.cache_candidates() {
        match fs::remove_dir_all(&cache_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e)),
        }
    }
    Ok(cleared)
}

fn list_dir(dir: &Path) -> Result<Vec<CacheEntry>, StorageError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::Io(e)),
    };

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(StorageError::Io)?;
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let mtime_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);
        items.push(CacheEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: meta.len(),
            mtime_ms,
        });
    }
    Ok(items)
}
