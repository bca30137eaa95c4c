use crate::errors::MediaError;

const MAX_KEY_LEN: usize = 256;

/// テナントキーを検証する。
///
/// テナントキーはディレクトリ名になるため、パス区切りや相対参照を一切許さない。
pub fn validate_tenant_key(key: &str) -> Result<(), MediaError> {
    if key.is_empty() {
        return Err(MediaError::Validation("tenant key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(MediaError::Validation(format!(
            "tenant key is too long (max {MAX_KEY_LEN})"
        )));
    }
    if key == "." || key == ".." {
        return Err(MediaError::Validation(
            "tenant key must not be a relative path component".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(MediaError::Validation(format!(
            "invalid characters in tenant key: {key}"
        )));
    }
    Ok(())
}

/// ファイル名を検証する。
///
/// ディレクトリトラバーサル防止のため、単一のパス要素のみ許可する。
pub fn validate_filename(name: &str) -> Result<(), MediaError> {
    if name.is_empty() {
        return Err(MediaError::Validation("filename is empty".to_string()));
    }
    if name.len() > MAX_KEY_LEN {
        return Err(MediaError::Validation(format!(
            "filename is too long (max {MAX_KEY_LEN})"
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(MediaError::Validation("path traversal detected".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(MediaError::Validation(format!(
            "invalid characters in filename: {name}"
        )));
    }
    Ok(())
}
