//! 沿中心线的强度剖面.
//!
//! 处理流程:
//!
//! 1. 以固定采样宽度沿中心线拉直原图, 得到高为采样宽度的条带;
//! 2. 按列聚合 (均值/中位数/求和), 得到原始剖面;
//! 3. 去除剖面尾部的零值列;
//! 4. 对距离和强度分别做滑动平均;
//! 5. 截取平滑剖面中不低于相对阈值的连续区间.

mod aggregate;
mod signal;
mod straighten;

pub use aggregate::{aggregate, aggregate_columns, mean, median};
pub use signal::{rolling_average, threshold_scan, trailing_nonzero_len, ThresholdScan};
pub use straighten::{resample_unit, straighten};

use crate::centerline::Centerline;
use crate::error::InitSpecError;
use crate::{Calibration, Channel};
use itertools::izip;
use log::debug;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
pub use aggregate::par_aggregate_columns;

/// 截面聚合方法.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Method {
    /// 均值.
    #[default]
    Mean,
    /// 中位数. 偶数个值时取中间两数的平均.
    Median,
    /// 求和.
    Sum,
}

impl FromStr for Method {
    type Err = InitSpecError;

    /// 忽略大小写.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "sum" => Ok(Self::Sum),
            _ => Err(InitSpecError::UnknownMethod),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Sum => "sum",
        };
        f.write_str(s)
    }
}

/// 剖面计算参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfileSpec {
    /// 截面聚合方法.
    method: Method,

    /// 采样宽度 (单位: 像素), 即拉直条带的高度.
    sample_width: u32,

    /// 滑动平均窗口.
    window: usize,

    /// 相对强度阈值, 位于 `[0, 1]`.
    threshold: f64,

    /// 剪枝的最短分支长度 (单位: 像素).
    min_branch_length: f64,
}

impl ProfileSpec {
    /// 构建参数. 存在非法参数时返回对应的 [`InitSpecError`].
    pub fn new(
        method: Method,
        sample_width: u32,
        window: usize,
        threshold: f64,
        min_branch_length: f64,
    ) -> Result<Self, InitSpecError> {
        if sample_width == 0 {
            return Err(InitSpecError::ZeroSampleWidth);
        }
        if window == 0 {
            return Err(InitSpecError::ZeroWindow);
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(InitSpecError::ThresholdOutOfRange(threshold));
        }
        if !(min_branch_length.is_finite() && min_branch_length > 0.0) {
            return Err(InitSpecError::NonPositiveBranchLength(min_branch_length));
        }
        Ok(Self {
            method,
            sample_width,
            window,
            threshold,
            min_branch_length,
        })
    }

    /// 截面聚合方法.
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// 采样宽度.
    #[inline]
    pub fn sample_width(&self) -> u32 {
        self.sample_width
    }

    /// 滑动平均窗口.
    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 用户给定的相对阈值.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 剪枝的最短分支长度.
    #[inline]
    pub fn min_branch_length(&self) -> f64 {
        self.min_branch_length
    }

    /// 实际用于裁剪的相对阈值.
    ///
    /// 求和聚合下, 剖面值约为均值的 `sample_width` 倍, 阈值随之放大.
    pub fn effective_threshold(&self) -> f64 {
        match self.method {
            Method::Sum => self.threshold * self.sample_width as f64,
            _ => self.threshold,
        }
    }
}

/// 均值聚合, 宽度 10, 窗口 10, 阈值 10%, 最短分支 10 像素.
impl Default for ProfileSpec {
    fn default() -> Self {
        Self {
            method: Method::Mean,
            sample_width: 10,
            window: 10,
            threshold: 0.1,
            min_branch_length: 10.0,
        }
    }
}

/// 等长的 (距离, 强度) 序列.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Series {
    distance: Vec<f64>,
    intensity: Vec<f64>,
}

impl Series {
    /// 两个序列长度不一致时返回 `None`.
    pub fn new(distance: Vec<f64>, intensity: Vec<f64>) -> Option<Self> {
        (distance.len() == intensity.len()).then_some(Self {
            distance,
            intensity,
        })
    }

    /// 距离.
    #[inline]
    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    /// 强度.
    #[inline]
    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// 长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// 迭代 `(距离, 强度)`.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        izip!(self.distance.iter().copied(), self.intensity.iter().copied())
    }

    /// 前 `len` 个元素.
    fn head(&self, len: usize) -> Series {
        Series {
            distance: self.distance[..len].to_vec(),
            intensity: self.intensity[..len].to_vec(),
        }
    }

    /// 两个序列分别做滑动平均.
    fn rolling(&self, window: usize) -> Series {
        Series {
            distance: rolling_average(&self.distance, window),
            intensity: rolling_average(&self.intensity, window),
        }
    }
}

/// 单个 ROI 的强度剖面.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntensityProfile {
    /// 原始剖面, 包含尾部零值列.
    pub raw: Series,

    /// 去除尾部零值后的滑动平均剖面.
    pub smoothed: Series,

    /// 阈值裁剪后的剖面. 没有信号时为 `None`.
    pub trimmed: Option<Series>,

    /// 阈值的绝对值. 平滑剖面为空时为 `None`.
    pub threshold_value: Option<f64>,

    /// 距离单位.
    pub unit: String,
}

impl IntensityProfile {
    /// 由每一列的聚合值构建剖面.
    pub fn from_columns(columns: &[f64], calibration: &Calibration, spec: &ProfileSpec) -> Self {
        let pw = calibration.pixel_width();
        let raw = Series {
            distance: (0..columns.len()).map(|i| i as f64 * pw).collect(),
            intensity: columns.to_vec(),
        };

        let valid = trailing_nonzero_len(&raw.intensity);
        let smoothed = raw.head(valid).rolling(spec.window());
        let scan = threshold_scan(&smoothed.intensity, spec.effective_threshold());
        debug!(
            "剖面: {} 列 (有效 {valid}), 平滑后 {} 点, 阈值区间 {:?}..={:?}",
            raw.len(),
            smoothed.len(),
            scan.first,
            scan.last
        );

        let trimmed = scan.window().map(|r| Series {
            distance: smoothed.distance[r.clone()].to_vec(),
            intensity: smoothed.intensity[r].to_vec(),
        });
        Self {
            raw,
            smoothed,
            trimmed,
            threshold_value: scan.threshold_value,
            unit: calibration.unit().to_string(),
        }
    }
}

/// 拉直条带及其剖面.
#[derive(Clone, Debug)]
pub struct Profiled {
    /// 拉直后的条带, 高为采样宽度.
    pub strip: Channel,
    /// 剖面.
    pub profile: IntensityProfile,
}

/// 沿 `centerline` 拉直 `channel` 并计算剖面. 条带以 `title` 命名.
pub fn profile_centerline(
    channel: &Channel,
    centerline: &Centerline,
    spec: &ProfileSpec,
    title: impl Into<String>,
) -> Profiled {
    let strip = straighten(
        channel.slice(),
        &centerline.polyline(),
        spec.sample_width(),
    );

    #[cfg(feature = "rayon")]
    let columns = par_aggregate_columns(strip.view(), spec.method());
    #[cfg(not(feature = "rayon"))]
    let columns = aggregate_columns(strip.view(), spec.method());

    let calibration = channel.calibration().clone();
    let profile = IntensityProfile::from_columns(&columns, &calibration, spec);
    Profiled {
        strip: Channel::new(title, strip, calibration),
        profile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(method: Method, width: u32, window: usize, t: f64) -> ProfileSpec {
        ProfileSpec::new(method, width, window, t, 10.0).unwrap()
    }

    #[test]
    fn test_spec_validation() {
        assert_eq!(
            ProfileSpec::new(Method::Mean, 0, 1, 0.1, 1.0),
            Err(InitSpecError::ZeroSampleWidth)
        );
        assert_eq!(
            ProfileSpec::new(Method::Mean, 1, 0, 0.1, 1.0),
            Err(InitSpecError::ZeroWindow)
        );
        assert_eq!(
            ProfileSpec::new(Method::Mean, 1, 1, 1.5, 1.0),
            Err(InitSpecError::ThresholdOutOfRange(1.5))
        );
        assert_eq!(
            ProfileSpec::new(Method::Mean, 1, 1, 0.5, 0.0),
            Err(InitSpecError::NonPositiveBranchLength(0.0))
        );
        assert!(ProfileSpec::new(Method::Mean, 1, 1, 1.0, 0.5).is_ok());
    }

    #[test]
    fn test_default_spec() {
        let s = ProfileSpec::default();
        assert_eq!(s.method(), Method::Mean);
        assert_eq!(s.sample_width(), 10);
        assert_eq!(s.window(), 10);
        assert_eq!(s.threshold(), 0.1);
        assert_eq!(s.min_branch_length(), 10.0);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("Median".parse::<Method>(), Ok(Method::Median));
        assert_eq!(" SUM ".parse::<Method>(), Ok(Method::Sum));
        assert_eq!("mean".parse::<Method>(), Ok(Method::Mean));
        assert_eq!("mode".parse::<Method>(), Err(InitSpecError::UnknownMethod));
        assert_eq!(Method::Median.to_string(), "median");
    }

    #[test]
    fn test_sum_threshold_scaled_by_width() {
        assert_eq!(spec(Method::Sum, 4, 1, 0.25).effective_threshold(), 1.0);
        assert_eq!(spec(Method::Median, 4, 1, 0.25).effective_threshold(), 0.25);
    }

    #[test]
    fn test_from_columns_strips_tail_and_trims() {
        let cal = Calibration::new(0.5, "micron").unwrap();
        let cols = [0.0, 1.0, 5.0, 9.0, 5.0, 1.0, 0.0, 0.0];
        let p = IntensityProfile::from_columns(&cols, &cal, &spec(Method::Mean, 1, 1, 0.5));

        assert_eq!(p.raw.len(), 8);
        assert_eq!(p.raw.distance()[2], 1.0);
        // 尾部两个零值列被去除; 窗口 1 时平滑不改变数据.
        assert_eq!(p.smoothed.len(), 6);
        assert_eq!(p.threshold_value, Some(4.5));

        let t = p.trimmed.unwrap();
        assert_eq!(t.intensity(), &[5.0, 9.0, 5.0]);
        assert_eq!(t.distance(), &[1.0, 1.5, 2.0]);
        assert_eq!(p.unit, "micron");
    }

    #[test]
    fn test_from_columns_no_signal() {
        let cal = Calibration::default();
        let p = IntensityProfile::from_columns(&[0.0; 5], &cal, &ProfileSpec::default());
        assert_eq!(p.raw.len(), 5);
        assert!(p.smoothed.is_empty());
        assert!(p.trimmed.is_none());
        assert_eq!(p.threshold_value, None);

        // 窗口大于剖面长度.
        let p = IntensityProfile::from_columns(&[1.0, 2.0], &cal, &ProfileSpec::default());
        assert!(p.smoothed.is_empty());
        assert!(p.trimmed.is_none());
    }

    #[test]
    fn test_series_length_mismatch() {
        assert!(Series::new(vec![1.0], vec![]).is_none());
        let s = Series::new(vec![0.0, 1.0], vec![3.0, 4.0]).unwrap();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![(0.0, 3.0), (1.0, 4.0)]);
    }
}
