use crate::{Channel, ChannelSlice, Roi};
use log::debug;

/// 用 `rois` 估计背景强度: 每个 ROI 求像素均值, 再对这些均值求平均并向零截断.
///
/// 完全越界的 ROI 被忽略; 没有可用 ROI 时返回 `None`.
pub fn estimate_background(image: ChannelSlice, rois: &[Roi]) -> Option<f32> {
    let means: Vec<f64> = rois
        .iter()
        .filter_map(|r| image.mean_over(r.area.iter().copied()))
        .collect();
    if means.is_empty() {
        return None;
    }
    let bg = (means.iter().sum::<f64>() / means.len() as f64).trunc() as f32;
    debug!("背景: {} 个 ROI, 强度 {bg}", means.len());
    Some(bg)
}

/// 就地从 `channel` 中扣除 `background`, 结果不低于 0.
pub fn subtract_background(channel: &mut Channel, background: f32) {
    channel
        .data_mut()
        .mapv_inplace(|v| (v - background).max(0.0));
}
