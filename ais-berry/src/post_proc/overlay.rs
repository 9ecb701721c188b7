use crate::centerline::{Centerline, LocalFrame};
use crate::consts::gray::{ANGLE_CODE_BASE, NUCLEUS_ASSOCIATED, NUCLEUS_OTHER, ORTHOGONAL_MARK};
use crate::landmark::Landmark;
use crate::{Idx2d, OwnedMask};

/// 把切线角度 (度) 编码为像素值: `trunc(33 + angle / 2)`, 按 8-bit 回绕.
#[inline]
pub fn angle_code(angle: f64) -> u8 {
    ((ANGLE_CODE_BASE + angle / 2.0) as i64).rem_euclid(256) as u8
}

/// 绘制中心线标注图.
///
/// 依次绘制:
///
/// 1. 地标区域: 下标为 `associated` 的地标填充 128, 其余填充 255;
/// 2. 中心线上的每一点, 值为 [`angle_code`];
/// 3. 每一点的两个垂直标记点, 值为 255.
///
/// 越界的点被忽略. `frames` 应当与中心线逐点对应.
pub fn render_overlay(
    shape: Idx2d,
    centerline: &Centerline,
    frames: &[LocalFrame],
    landmarks: &[Landmark],
    associated: Option<usize>,
) -> OwnedMask {
    let mut canvas = OwnedMask::zeros(shape);
    let mut m = canvas.as_mutable();

    for (i, lm) in landmarks.iter().enumerate() {
        let value = if Some(i) == associated {
            NUCLEUS_ASSOCIATED
        } else {
            NUCLEUS_OTHER
        };
        m.fill_batch(lm.region().iter().copied(), value);
    }
    for (p, f) in centerline.points().iter().zip(frames) {
        m.fill_batch(p.to_idx(), angle_code(f.angle));
    }
    for f in frames {
        let marks = [f.ortho.0.to_idx(), f.ortho.1.to_idx()];
        m.fill_batch(marks.into_iter().flatten(), ORTHOGONAL_MARK);
    }
    canvas
}
