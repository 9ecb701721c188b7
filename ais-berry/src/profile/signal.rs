//! 一维信号处理: 尾部零值、滑动平均与阈值裁剪.

use std::ops::RangeInclusive;

/// 滑动平均, 步长 1. 输出长度为 `values.len() - window + 1`;
/// `window` 为 0 或大于输入长度时输出为空.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return vec![];
    }
    let n = window as f64;
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / n)
        .collect()
}

/// 去除尾部零值后的有效长度, 即最后一个非零值的下标加 1. 全零时返回 0.
#[inline]
pub fn trailing_nonzero_len(values: &[f64]) -> usize {
    values.iter().rposition(|&v| v != 0.0).map_or(0, |i| i + 1)
}

/// 阈值扫描结果.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThresholdScan {
    /// `fraction * max`. 输入为空时为 `None`.
    pub threshold_value: Option<f64>,

    /// 从头开始第一个不低于阈值的下标.
    pub first: Option<usize>,

    /// 从尾开始第一个不低于阈值的下标.
    pub last: Option<usize>,
}

impl ThresholdScan {
    const EMPTY: ThresholdScan = ThresholdScan {
        threshold_value: None,
        first: None,
        last: None,
    };

    /// 闭区间 `[first, last]`. 任一端没有找到时返回 `None`.
    #[inline]
    pub fn window(&self) -> Option<RangeInclusive<usize>> {
        Some(self.first?..=self.last?)
    }
}

/// 以 `fraction * max(values)` 为阈值, 找出首尾两个不低于阈值的下标.
///
/// 峰值不为正时视为没有信号, 两端都返回 `None`.
pub fn threshold_scan(values: &[f64], fraction: f64) -> ThresholdScan {
    let Some(max) = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
    else {
        return ThresholdScan::EMPTY;
    };

    let threshold = fraction * max;
    if max <= 0.0 {
        return ThresholdScan {
            threshold_value: Some(threshold),
            ..ThresholdScan::EMPTY
        };
    }
    ThresholdScan {
        threshold_value: Some(threshold),
        first: values.iter().position(|&v| v >= threshold),
        last: values.iter().rposition(|&v| v >= threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average() {
        assert_eq!(
            rolling_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 2),
            vec![1.5, 2.5, 3.5, 4.5]
        );
        assert_eq!(rolling_average(&[1.0, 2.0, 3.0], 3), vec![2.0]);
        assert!(rolling_average(&[1.0, 2.0], 3).is_empty());
        assert!(rolling_average(&[1.0, 2.0], 0).is_empty());
        assert!(rolling_average(&[], 1).is_empty());
    }

    #[test]
    fn test_trailing_nonzero_len() {
        assert_eq!(trailing_nonzero_len(&[0.0, 3.0, 0.0, 2.0, 0.0, 0.0]), 4);
        assert_eq!(trailing_nonzero_len(&[1.0]), 1);
        assert_eq!(trailing_nonzero_len(&[0.0, 0.0]), 0);
        assert_eq!(trailing_nonzero_len(&[]), 0);
    }

    #[test]
    fn test_threshold_scan() {
        let s = threshold_scan(&[0.0, 1.0, 5.0, 9.0, 5.0, 1.0, 0.0], 0.5);
        assert_eq!(s.threshold_value, Some(4.5));
        assert_eq!(s.first, Some(2));
        assert_eq!(s.last, Some(4));
        assert_eq!(s.window(), Some(2..=4));
    }

    #[test]
    fn test_threshold_scan_no_signal() {
        let s = threshold_scan(&[], 0.5);
        assert_eq!(s, ThresholdScan::EMPTY);
        assert_eq!(s.window(), None);

        let s = threshold_scan(&[0.0; 4], 0.1);
        assert_eq!(s.first, None);
        assert_eq!(s.last, None);
        assert_eq!(s.threshold_value, Some(0.0));
    }

    #[test]
    fn test_threshold_above_peak() {
        // 放大后的阈值可能高于峰值.
        let s = threshold_scan(&[1.0, 2.0, 1.0], 2.0);
        assert_eq!(s.window(), None);
    }
}
