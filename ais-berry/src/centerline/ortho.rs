//! 中心线上每个点的局部切线角度与垂直标记点.

use crate::skeleton::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 位于中心线两侧, 与局部切线垂直的一对点.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrthogonalPair(pub Point, pub Point);

/// 中心线某一点处的局部几何.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalFrame {
    /// 局部切线角度 (单位: 度). 屏幕坐标系, y 轴向下, 因此取 `p1.y - p2.y`.
    pub angle: f64,
    /// 垂直标记点.
    pub ortho: OrthogonalPair,
}

/// 计算 `points` 每一点的局部几何.
///
/// 对第 `i` 个点, 取 `scope = sample_width / 2`,
/// `p1 = points[i - scope]`, `p2 = points[i + scope]` (下标截断到合法范围).
/// 切线角度为 `atan2(p1.y - p2.y, p2.x - p1.x)`; 把 `p1`, `p2` 绕其中点旋转 90°
/// 得到垂直标记点, 坐标向零截断.
pub fn local_frames(points: &[Point], sample_width: u32) -> Vec<LocalFrame> {
    let n = points.len();
    let scope = (sample_width / 2) as usize;
    (0..n)
        .map(|i| {
            let p1 = points[i.saturating_sub(scope)];
            let p2 = points[(i + scope).min(n - 1)];
            let angle = ((p1.y - p2.y) as f64)
                .atan2((p2.x - p1.x) as f64)
                .to_degrees();

            let mx = (p1.x + p2.x) as f64 * 0.5;
            let my = (p1.y + p2.y) as f64 * 0.5;
            let rotate = |p: Point| {
                Point::xy(
                    (-(p.y as f64 - my) + mx) as i32,
                    ((p.x as f64 - mx) + my) as i32,
                )
            };
            LocalFrame {
                angle,
                ortho: OrthogonalPair(rotate(p1), rotate(p2)),
            }
        })
        .collect()
}
