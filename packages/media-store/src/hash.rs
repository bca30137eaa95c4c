use sha2::{Digest, Sha256};

use crate::constants::HASH_HEX_LEN;

/// バイト列からコンテンツ ID を導出する。
///
/// SHA-256 ダイジェストの16進表現を先頭16文字に切り詰めたもの。
/// 同一バイト列は常に同一 ID になる（重複排除するかは呼び出し側の判断）。
pub fn content_hash16(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut id = hex::encode(digest);
    id.truncate(HASH_HEX_LEN);
    id
}
