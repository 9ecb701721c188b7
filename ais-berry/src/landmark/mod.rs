//! 地标 (细胞核) 及其最近邻查询.

mod detect;

pub use detect::ParticleDetector;

use crate::{Area2d, Idx2dF, MaskSlice};
use ordered_float::NotNan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一个检测到的地标 (细胞核).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    id: usize,
    label: Option<String>,
    /// `(x, y)`.
    centroid: Idx2dF,
    region: Area2d,
}

impl Landmark {
    /// 以区域像素的平均位置为质心构建地标. 像素 `(h, w)` 的中心位于 `(w + 0.5, h + 0.5)`.
    ///
    /// `region` 为空时返回 `None`.
    pub fn from_region(id: usize, region: Area2d) -> Option<Self> {
        if region.is_empty() {
            return None;
        }
        let n = region.len() as f64;
        let (sx, sy) = region
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(h, w)| (sx + w as f64, sy + h as f64));
        Some(Self {
            id,
            label: None,
            centroid: (sx / n + 0.5, sy / n + 0.5),
            region,
        })
    }

    /// 直接指定质心.
    pub fn with_centroid(id: usize, centroid: Idx2dF, region: Area2d) -> Self {
        Self {
            id,
            label: None,
            centroid,
            region,
        }
    }

    /// 检测序号.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// 标签.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// 重新设置标签.
    #[inline]
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// 质心 `(x, y)`.
    #[inline]
    pub fn centroid(&self) -> Idx2dF {
        self.centroid
    }

    /// 区域像素.
    #[inline]
    pub fn region(&self) -> &[crate::Idx2d] {
        &self.region
    }

    /// 质心到 `(x, y)` 的欧几里得距离.
    #[inline]
    pub fn distance_to(&self, (x, y): Idx2dF) -> f64 {
        ((self.centroid.0 - x).powi(2) + (self.centroid.1 - y).powi(2)).sqrt()
    }
}

/// 检测地标的方式.
pub trait BlobDetector {
    /// 在二值掩膜中检测地标. 返回的地标 `id` 与其在结果中的下标一致.
    fn detect(&self, mask: MaskSlice<'_>) -> Vec<Landmark>;
}

/// 最近邻查询的结果.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Nearest {
    index: Option<usize>,
    distance: f64,
}

impl Nearest {
    /// 没有任何匹配. 距离为正无穷.
    pub const NONE: Nearest = Nearest {
        index: None,
        distance: f64::INFINITY,
    };

    /// 最近地标的下标.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// 到最近地标的距离. 没有匹配时为正无穷.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// 在 `landmarks` 中查找质心离 `(x, y)` 最近的地标.
///
/// 距离相同时取下标较小者. `landmarks` 为空时返回 [`Nearest::NONE`].
pub fn nearest_landmark(pos: Idx2dF, landmarks: &[Landmark]) -> Nearest {
    landmarks
        .iter()
        .enumerate()
        .filter_map(|(i, lm)| NotNan::new(lm.distance_to(pos)).ok().map(|d| (i, d)))
        .min_by_key(|&(_, d)| d)
        .map_or(Nearest::NONE, |(i, d)| Nearest {
            index: Some(i),
            distance: d.into_inner(),
        })
}
