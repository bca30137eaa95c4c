mod cache;
mod serve;
mod sweeper;
mod writer;

pub use cache::{CacheEntry, CacheKey, CacheListing};
pub use serve::{ServeReply, ServeRequest, CACHE_CONTROL_IMMUTABLE};
pub use writer::{FileVariant, StoredFile};

use crate::config::StoreConfig;
use crate::errors::MediaError;
use crate::paths::TenantDirs;

/// ストレージエンジンのファサード。
///
/// メタデータストア（画像レコード・テナント解決）は外部の協調コンポーネントで、
/// このエンジンはファイルシステムだけを扱う。各メソッドはステートレスで、
/// 同期実行される（CPU バウンドな処理を行うため、非同期ランタイムから呼ぶ場合は
/// ブロッキングプールに載せること）。
#[derive(Debug, Clone)]
pub struct MediaStore {
    config: StoreConfig,
}

impl MediaStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// バイト列を保存し、画像なら派生アーティファクトを生成する。
    pub fn store(
        &self,
        data: &[u8],
        original_name: &str,
        tenant_key: &str,
        content_type: &str,
    ) -> Result<StoredFile, MediaError> {
        writer::save_file(&self.config, data, original_name, tenant_key, content_type)
    }

    /// 変換リクエストを配信する（必要ならその場で生成してキャッシュ）。
    pub fn serve(
        &self,
        tenant_key: &str,
        legacy_key: Option<&str>,
        req: &ServeRequest,
    ) -> Result<ServeReply, MediaError> {
        serve::serve(&self.config, tenant_key, legacy_key, req)
    }

    /// 元ファイル・兄弟・キャッシュアーティファクトを両ディレクトリから掃除する。
    pub fn delete(
        &self,
        tenant_key: &str,
        legacy_key: Option<&str>,
        base_id: &str,
        filename: &str,
        sibling_filenames: &[String],
    ) -> Result<(), MediaError> {
        let dirs = self.dirs(tenant_key, legacy_key)?;
        sweeper::sweep(&dirs, base_id, filename, sibling_filenames)
    }

    /// キャッシュアーティファクトを列挙する（運用向け）。
    pub fn list_cache(
        &self,
        tenant_key: &str,
        legacy_key: Option<&str>,
    ) -> Result<CacheListing, MediaError> {
        let dirs = self.dirs(tenant_key, legacy_key)?;
        Ok(cache::list_cache(&dirs)?)
    }

    /// キャッシュディレクトリを丸ごと削除し、解放したバイト数を返す。
    pub fn clear_cache(
        &self,
        tenant_key: &str,
        legacy_key: Option<&str>,
    ) -> Result<u64, MediaError> {
        let dirs = self.dirs(tenant_key, legacy_key)?;
        Ok(cache::clear_cache(&dirs)?)
    }

    fn dirs(&self, tenant_key: &str, legacy_key: Option<&str>) -> Result<TenantDirs, MediaError> {
        TenantDirs::resolve(&self.config.upload_root, tenant_key, legacy_key)
    }
}
