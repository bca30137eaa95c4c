/// fit=inside 相当の出力寸法を計算する。
///
/// アスペクト比を維持しつつ指定領域に収まる寸法を返す。
/// 片方のみ指定された場合はもう片方を比率から導出する。
/// 元画像より大きくはしない（withoutEnlargement）。
pub fn fit_within(
    src_w: u32,
    src_h: u32,
    target_w: Option<u32>,
    target_h: Option<u32>,
) -> (u32, u32) {
    let scale = match (target_w, target_h) {
        (None, None) => 1.0,
        (Some(w), None) => w as f64 / src_w as f64,
        (None, Some(h)) => h as f64 / src_h as f64,
        (Some(w), Some(h)) => (w as f64 / src_w as f64).min(h as f64 / src_h as f64),
    };

    if scale >= 1.0 {
        return (src_w, src_h);
    }

    // 最小1pxを保証
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// どちらかの寸法が `max_dim` を超える場合の縮小後寸法を返す。
///
/// 超えていなければ `None`（縮小不要）。
pub fn shrink_to_max(src_w: u32, src_h: u32, max_dim: u32) -> Option<(u32, u32)> {
    if src_w <= max_dim && src_h <= max_dim {
        return None;
    }
    Some(fit_within(src_w, src_h, Some(max_dim), Some(max_dim)))
}
