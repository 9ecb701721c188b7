//! 8-邻域相关的基础操作.

use crate::Idx2d;

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
///
/// 越过下界的分量会回绕为极大值, 因此可以直接交给带越界检查的访问函数.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

/// 计算两个 8-相邻像素之间的欧几里得步长. 如果这两个点不以 8-邻接则返回 `None`.
#[inline]
pub fn step_length((a, b): Idx2d, (c, d): Idx2d) -> Option<f64> {
    match (a.abs_diff(c), b.abs_diff(d)) {
        (1, 0) | (0, 1) => Some(1.0),
        (1, 1) => Some(std::f64::consts::SQRT_2),
        _ => None,
    }
}
