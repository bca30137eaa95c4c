use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::CACHE_DIR_NAME;
use crate::errors::{MediaError, StorageError};
use crate::validation::validate_tenant_key;

/// 元ファイル探索時に試す拡張子の優先順。
///
/// webp を後ろに置くことで、jpg/png 元画像が自身の webp 兄弟より先に見つかる。
const ORIGINAL_EXT_PRIORITY: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// テナントのストレージディレクトリ一式。
///
/// 読み取り・削除は必ず `candidates()` の順（プライマリ → レガシー）で試す。
/// レガシーディレクトリは旧 ID ベースのレイアウトとの互換のために残っている。
#[derive(Debug, Clone)]
pub struct TenantDirs {
    primary: PathBuf,
    legacy: Option<PathBuf>,
}

impl TenantDirs {
    /// テナントキー（とレガシーキー）からディレクトリを解決する。
    pub fn resolve(
        root: &Path,
        tenant_key: &str,
        legacy_key: Option<&str>,
    ) -> Result<Self, MediaError> {
        validate_tenant_key(tenant_key)?;
        let legacy = match legacy_key {
            Some(key) if key != tenant_key => {
                validate_tenant_key(key)?;
                Some(root.join(key))
            }
            _ => None,
        };
        Ok(Self {
            primary: root.join(tenant_key),
            legacy,
        })
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn primary_cache(&self) -> PathBuf {
        self.primary.join(CACHE_DIR_NAME)
    }

    /// 順序付きの候補ディレクトリ一覧（プライマリ → レガシー）
    pub fn candidates(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.legacy.as_deref())
    }

    /// 各候補ディレクトリ配下のキャッシュディレクトリ一覧
    pub fn cache_candidates(&self) -> Vec<PathBuf> {
        self.candidates().map(|d| d.join(CACHE_DIR_NAME)).collect()
    }

    /// 候補ディレクトリを順に試してファイルを読む。
    ///
    /// 全候補で存在しない場合のみ `NotFound`。それ以外の IO エラーは即座に返す。
    pub fn read_first(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        for dir in self.candidates() {
            match fs::read(dir.join(filename)) {
                Ok(data) => return Ok(data),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Err(StorageError::NotFound {
            name: filename.to_string(),
        })
    }

    /// base ID から元ファイル名を探索する。
    ///
    /// メタデータ側でファイル名が解決できなかった場合のフォールバック。
    pub fn locate_original(&self, base_id: &str) -> Option<String> {
        for dir in self.candidates() {
            for ext in ORIGINAL_EXT_PRIORITY {
                let name = format!("{base_id}.{ext}");
                if dir.join(&name).is_file() {
                    return Some(name);
                }
            }
            // 拡張子なしで保存されたファイル
            if dir.join(base_id).is_file() {
                return Some(base_id.to_string());
            }
        }
        None
    }
}

/// ディレクトリを冪等に作成する。
///
/// 並行呼び出しで他のリクエストが先に作成していても成功として扱う。
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
