use super::{BlobDetector, Landmark};
use crate::consts::NUCLEUS_MIN_SIZE;
use crate::MaskSlice;

/// 连通域分析: 把二值掩膜中每个 8-连通前景区域视为一个粒子,
/// 丢弃面积小于 `min_size` 的粒子.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParticleDetector {
    /// 最小面积 (像素数).
    pub min_size: usize,
}

impl Default for ParticleDetector {
    fn default() -> Self {
        Self {
            min_size: NUCLEUS_MIN_SIZE,
        }
    }
}

impl BlobDetector for ParticleDetector {
    fn detect(&self, mask: MaskSlice<'_>) -> Vec<Landmark> {
        mask.foreground_areas()
            .into_iter()
            .filter(|a| a.len() >= self.min_size)
            .enumerate()
            .filter_map(|(id, a)| Landmark::from_region(id, a))
            .collect()
    }
}
