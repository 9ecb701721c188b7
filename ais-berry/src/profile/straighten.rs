//! 沿折线拉直图像.

use crate::{ChannelSlice, Idx2dF};
use ndarray::Array2;

const EPS: f64 = 1e-9;

/// 以单位弧长重新采样折线 `(x, y)`. 保留起点; 重复的相邻点被忽略.
///
/// 返回点数为 `floor(折线长度) + 1`. 空折线返回空.
pub fn resample_unit(polyline: &[Idx2dF]) -> Vec<Idx2dF> {
    let Some(&start) = polyline.first() else {
        return vec![];
    };
    let mut ans = vec![start];
    // 上一个采样点到当前线段起点的弧长.
    let mut carry = 0.0;
    for seg in polyline.windows(2) {
        let ((x0, y0), (x1, y1)) = (seg[0], seg[1]);
        let len = (x1 - x0).hypot(y1 - y0);
        if len < EPS {
            continue;
        }
        let mut t = 1.0 - carry;
        while t <= len + EPS {
            let r = t / len;
            ans.push((x0 + (x1 - x0) * r, y0 + (y1 - y0) * r));
            t += 1.0;
        }
        carry = len - (t - 1.0);
    }
    ans
}

/// 双线性插值. 越界像素读作 0.
fn interpolate(image: ChannelSlice, x: f64, y: f64) -> f64 {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let pixel = |xi: f64, yi: f64| -> f64 {
        if xi < 0.0 || yi < 0.0 {
            return 0.0;
        }
        image
            .get((yi as usize, xi as usize))
            .map_or(0.0, |&v| v as f64)
    };
    let top = pixel(x0, y0) * (1.0 - fx) + pixel(x0 + 1.0, y0) * fx;
    let bottom = pixel(x0, y0 + 1.0) * (1.0 - fx) + pixel(x0 + 1.0, y0 + 1.0) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// 沿折线 `polyline` 拉直 `image`.
///
/// 折线先以单位弧长重新采样为 `n` 个点; 对第 `i` 个点, 沿其法线方向在以该点为中心的
/// `width` 个位置上做双线性插值, 写入结果的第 `i` 列. 结果形状为 `(width, n)`.
/// 最后一个点沿用前一段的方向; 只有一个点时方向取水平向右.
pub fn straighten(image: ChannelSlice, polyline: &[Idx2dF], width: u32) -> Array2<f32> {
    let points = resample_unit(polyline);
    let n = points.len();
    let height = width as usize;
    let mut strip = Array2::zeros((height, n));

    let half = (width as f64 - 1.0) / 2.0;
    let (mut dx, mut dy) = (1.0, 0.0);
    for (i, &(x, y)) in points.iter().enumerate() {
        if let Some(&(nx, ny)) = points.get(i + 1) {
            let len = (nx - x).hypot(ny - y);
            if len > EPS {
                (dx, dy) = ((nx - x) / len, (ny - y) / len);
            }
        }
        // 法线 (-dy, dx).
        for j in 0..height {
            let off = j as f64 - half;
            strip[(j, i)] = interpolate(image, x - dy * off, y + dx * off) as f32;
        }
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Calibration, Channel};
    use ndarray::Array2;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_resample_unit() {
        let pts = resample_unit(&[(0.0, 0.0), (3.0, 0.0)]);
        assert_eq!(pts.len(), 4);
        assert!(float_eq(pts[3].0, 3.0));

        // 折角处的弧长是连续累计的.
        let pts = resample_unit(&[(0.0, 0.0), (1.5, 0.0), (1.5, 1.5)]);
        assert_eq!(pts.len(), 4);
        assert!(float_eq(pts[2].0, 1.5) && float_eq(pts[2].1, 0.5));
        assert!(float_eq(pts[3].1, 1.5));

        assert_eq!(resample_unit(&[(2.0, 2.0), (2.0, 2.0)]), vec![(2.0, 2.0)]);
        assert!(resample_unit(&[]).is_empty());
    }

    #[test]
    fn test_straighten_horizontal() {
        // 每列的值等于其 x 坐标.
        let c = Channel::new(
            "img",
            Array2::from_shape_fn((9, 20), |(_, w)| w as f32),
            Calibration::default(),
        );
        let strip = straighten(c.slice(), &[(2.0, 4.0), (12.0, 4.0)], 3);
        assert_eq!(strip.dim(), (3, 11));
        for i in 0..11 {
            for j in 0..3 {
                assert!(float_eq(strip[(j, i)] as f64, (i + 2) as f64));
            }
        }
    }

    #[test]
    fn test_straighten_vertical_normal_and_bilinear() {
        // 每行的值等于其 y 坐标; 中心线竖直, 法线水平, 因此条带每列都是常数.
        let c = Channel::new(
            "img",
            Array2::from_shape_fn((10, 10), |(h, _)| h as f32),
            Calibration::default(),
        );
        let strip = straighten(c.slice(), &[(5.0, 1.0), (5.0, 6.0)], 4);
        assert_eq!(strip.dim(), (4, 6));
        for i in 0..6 {
            for j in 0..4 {
                assert!(float_eq(strip[(j, i)] as f64, (i + 1) as f64));
            }
        }

        assert!(float_eq(interpolate(c.slice(), 3.0, 2.5), 2.5));
    }

    #[test]
    fn test_out_of_image_reads_zero() {
        let c = Channel::new("img", Array2::from_elem((4, 4), 10.0), Calibration::default());
        let strip = straighten(c.slice(), &[(0.0, 0.0), (3.0, 0.0)], 3);
        // 第一行位于 y = -1, 完全在图像外.
        assert!(strip.row(0).iter().all(|&v| v == 0.0));
        assert!(strip.row(1).iter().all(|&v| v == 10.0));
        assert!(strip.row(2).iter().all(|&v| v == 10.0));
    }
}
