use std::fs;
use std::io;
use std::path::Path;

use crate::errors::MediaError;
use crate::paths::TenantDirs;
use crate::validation::validate_filename;

/// 画像削除に伴うファイル掃除。
///
/// 元ファイル・申告された兄弟ファイルをプライマリ・レガシー両ディレクトリから削除し、
/// 続いて両キャッシュディレクトリから base ID で始まる全エントリを削除する。
/// 既に存在しないファイルは成功扱い。個別の削除失敗はログに残して続行する
/// （繰り返し呼べば最終的に掃除が完了する）。
pub fn sweep(
    dirs: &TenantDirs,
    base_id: &str,
    filename: &str,
    sibling_filenames: &[String],
) -> Result<(), MediaError> {
    validate_filename(base_id)?;
    validate_filename(filename)?;

    for dir in dirs.candidates() {
        remove_quietly(&dir.join(filename));
        for sibling in sibling_filenames {
            if validate_filename(sibling).is_err() {
                tracing::warn!(name = %sibling, "skipping sibling with invalid name");
                continue;
            }
            remove_quietly(&dir.join(sibling));
        }
    }

    for cache_dir in dirs.cache_candidates() {
        sweep_cache_dir(&cache_dir, base_id);
    }

    tracing::info!(id = %base_id, "swept stored file and cache artifacts");
    Ok(())
}

/// キャッシュディレクトリから `{base_id}` で始まる全エントリを削除する。
fn sweep_cache_dir(cache_dir: &Path, base_id: &str) {
    let entries = match fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            tracing::warn!(dir = %cache_dir.display(), error = %e, "failed to list cache dir");
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(base_id) {
            remove_quietly(&entry.path());
        }
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_sweep_removes_original_siblings_and_cache() {
        let root = TempDir::new().unwrap();
        let app = root.path().join("my-app");
        touch(&app.join("abc123.jpg"));
        touch(&app.join("abc123.webp"));
        touch(&app.join("abc123-placeholder.jpg"));
        touch(&app.join("_cache").join("abc123_w500_q85.jpg"));
        touch(&app.join("_cache").join("abc123_h100_q80.webp"));
        // 別画像のキャッシュは残る
        touch(&app.join("_cache").join("fff999_w500_q85.jpg"));

        let dirs = TenantDirs::resolve(root.path(), "my-app", None).unwrap();
        sweep(
            &dirs,
            "abc123",
            "abc123.jpg",
            &["abc123.webp".to_string(), "abc123-placeholder.jpg".to_string()],
        )
        .unwrap();

        assert!(!app.join("abc123.jpg").exists());
        assert!(!app.join("abc123.webp").exists());
        assert!(!app.join("abc123-placeholder.jpg").exists());
        assert!(!app.join("_cache").join("abc123_w500_q85.jpg").exists());
        assert!(!app.join("_cache").join("abc123_h100_q80.webp").exists());
        assert!(app.join("_cache").join("fff999_w500_q85.jpg").exists());
    }

    #[test]
    fn test_sweep_covers_legacy_directory() {
        let root = TempDir::new().unwrap();
        let legacy = root.path().join("old-id");
        touch(&legacy.join("abc123.jpg"));
        touch(&legacy.join("_cache").join("abc123_w10_q85.jpg"));

        let dirs = TenantDirs::resolve(root.path(), "my-app", Some("old-id")).unwrap();
        sweep(&dirs, "abc123", "abc123.jpg", &[]).unwrap();

        assert!(!legacy.join("abc123.jpg").exists());
        assert!(!legacy.join("_cache").join("abc123_w10_q85.jpg").exists());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let root = TempDir::new().unwrap();
        let dirs = TenantDirs::resolve(root.path(), "my-app", Some("old-id")).unwrap();
        // 何も存在しなくても成功する
        sweep(&dirs, "abc123", "abc123.jpg", &["abc123.webp".to_string()]).unwrap();
        sweep(&dirs, "abc123", "abc123.jpg", &["abc123.webp".to_string()]).unwrap();
    }

    #[test]
    fn test_sweep_rejects_traversal_in_ids() {
        let root = TempDir::new().unwrap();
        let dirs = TenantDirs::resolve(root.path(), "my-app", None).unwrap();
        assert!(sweep(&dirs, "../evil", "a.jpg", &[]).is_err());
        assert!(sweep(&dirs, "abc", "../a.jpg", &[]).is_err());
    }
}
