use crate::constants::MAX_DIMENSION;

/// リクエストされた寸法を正規化する。
///
/// 0 以下は「指定なし」として扱い、上限超過はエラーにせず上限へ丸める。
pub fn clamp_dimension(value: Option<i64>) -> Option<u32> {
    let v = value?;
    if v <= 0 {
        return None;
    }
    Some((v as u64).min(MAX_DIMENSION as u64) as u32)
}

/// リクエストされた品質を 1-100 に丸める。
pub fn clamp_quality(value: Option<i64>) -> Option<u8> {
    let v = value?;
    Some(v.clamp(1, 100) as u8)
}
