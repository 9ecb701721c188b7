//! 中心线选取与定向.
//!
//! 从 (剪枝后) 每个骨架分量的最长最短路径中, 选出点数最多的一条作为中心线,
//! 再根据两端各自最近的地标决定中心线的方向: 起点应当靠近其所属的细胞核.

mod ortho;

pub use ortho::{local_frames, LocalFrame, OrthogonalPair};

use crate::landmark::{nearest_landmark, Landmark};
use crate::skeleton::Point;
use crate::Idx2dF;
use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 有方向的中心线. 至少包含 2 个点.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Centerline {
    points: Vec<Point>,
}

impl Centerline {
    /// 点数少于 2 时返回 `None`.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        (points.len() >= 2).then_some(Self { points })
    }

    /// 按顺序排列的点.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// 点数.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 起点.
    #[inline]
    pub fn first(&self) -> Point {
        self.points[0]
    }

    /// 终点.
    #[inline]
    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// 以浮点 `(x, y)` 表示的折线, 供拉直使用.
    pub fn polyline(&self) -> Vec<Idx2dF> {
        self.points
            .iter()
            .map(|p| (p.x as f64, p.y as f64))
            .collect()
    }

    fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// 中心线相对于原始最短路径的方向.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// 保持原路径顺序.
    Forward,
    /// 原路径被反转.
    Reversed,
}

/// 中心线选取结果.
#[derive(Clone, Debug)]
pub struct Selection {
    /// 定向后的中心线.
    pub centerline: Centerline,
    /// 关联的地标在输入列表中的下标. 地标列表为空时为 `None`.
    pub landmark: Option<usize>,
    /// 中心线方向.
    pub orientation: Orientation,
}

impl Selection {
    /// 复制关联的地标, 并以 `"{name}-nucleus-ROI"` 为其重新设置标签.
    pub fn labelled_landmark(&self, landmarks: &[Landmark], name: &str) -> Option<Landmark> {
        let mut lm = landmarks.get(self.landmark?)?.clone();
        lm.set_label(format!("{name}-nucleus-ROI"));
        Some(lm)
    }
}

/// 选出点数最多的路径 (点数相同时取靠前者) 并按最近地标定向.
///
/// 设起点最近的地标为 `A` (距离 `d1`), 终点最近的地标为 `B` (距离 `d2`).
/// 仅当 `A != B` 且 `d2 < d1` 时反转中心线并关联 `B`; 否则保持方向并关联 `A`.
///
/// `paths` 为空, 或最长路径不足 2 个点时返回 `None`.
pub fn select_centerline(paths: &[Vec<Point>], landmarks: &[Landmark]) -> Option<Selection> {
    let longest = paths
        .iter()
        .reduce(|best, cur| if cur.len() > best.len() { cur } else { best })?;
    let mut centerline = Centerline::new(longest.clone())?;

    let pos = |p: Point| (p.x as f64, p.y as f64);
    let n1 = nearest_landmark(pos(centerline.first()), landmarks);
    let n2 = nearest_landmark(pos(centerline.last()), landmarks);
    trace!(
        "起点最近地标 {:?} ({}), 终点最近地标 {:?} ({})",
        n1.index(),
        n1.distance(),
        n2.index(),
        n2.distance()
    );

    let (landmark, orientation) = if n1.index() != n2.index() && n2.distance() < n1.distance() {
        centerline.reverse();
        (n2.index(), Orientation::Reversed)
    } else {
        (n1.index(), Orientation::Forward)
    };
    Some(Selection {
        centerline,
        landmark,
        orientation,
    })
}
