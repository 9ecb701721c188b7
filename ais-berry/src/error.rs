//! 运行时错误.

use std::fmt::{self, Formatter};
use std::path::PathBuf;

/// [`crate::profile::ProfileSpec`] 初始化错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitSpecError {
    /// 采样宽度必须为正整数.
    ZeroSampleWidth,

    /// 滑动平均窗口必须为正整数.
    ZeroWindow,

    /// 相对强度阈值必须在 `[0, 1]` 内.
    ThresholdOutOfRange(f64),

    /// 最短分支长度必须为正数.
    NonPositiveBranchLength(f64),

    /// 像素物理尺寸必须为正数.
    NonPositivePixelSize(f64),

    /// 无法识别的截面聚合方法名.
    UnknownMethod,
}

impl fmt::Display for InitSpecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSampleWidth => write!(f, "sample width must be positive"),
            Self::ZeroWindow => write!(f, "rolling average window must be positive"),
            Self::ThresholdOutOfRange(t) => write!(f, "relative threshold {t} not in [0, 1]"),
            Self::NonPositiveBranchLength(l) => {
                write!(f, "minimum branch length {l} must be positive")
            }
            Self::NonPositivePixelSize(s) => write!(f, "pixel size {s} must be positive"),
            Self::UnknownMethod => write!(f, "unknown aggregation method"),
        }
    }
}

impl std::error::Error for InitSpecError {}

/// 批处理或单图像处理的运行时错误.
#[derive(Debug)]
pub enum ProfileError {
    /// 输入目录不存在或不是目录. 致命错误, 整个批次直接中止.
    MissingInputDir(PathBuf),

    /// 图像通道数不足.
    ///
    /// 第一个参数是所需通道号 (从 1 开始), 第二个参数是图像实际通道数.
    ChannelOutOfRange(usize, usize),

    /// 图像为空 (高或宽为 0).
    EmptyImage,

    /// 参数错误.
    Spec(InitSpecError),

    /// 读写错误.
    Io(std::io::Error),

    /// 图像编解码错误.
    Image(image::ImageError),

    /// 结果表写入错误.
    Csv(csv::Error),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInputDir(p) => {
                write!(f, "{} does not exist or is not a directory", p.display())
            }
            Self::ChannelOutOfRange(want, have) => {
                write!(f, "channel {want} requested but image has {have} channels")
            }
            Self::EmptyImage => write!(f, "image is empty"),
            Self::Spec(e) => write!(f, "invalid configuration: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Image(e) => write!(f, "image error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InitSpecError> for ProfileError {
    fn from(value: InitSpecError) -> Self {
        Self::Spec(value)
    }
}

impl From<std::io::Error> for ProfileError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for ProfileError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<csv::Error> for ProfileError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// 批处理运行时结果.
pub type ProfileResult<T> = Result<T, ProfileError>;
