use thiserror::Error;

/// メディアストレージの統合エラー型
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

/// ファイルストレージアクセスエラー
#[derive(Debug, Error)]
pub enum StorageError {
    /// プライマリ・レガシー両ディレクトリに対象ファイルが存在しない
    #[error("file not found: {name}")]
    NotFound { name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
