use ndarray::{Array2, ArrayViewMut2};

use crate::error::InitSpecError;
use crate::{Area2d, Idx2d};

pub mod slice;
pub mod window;

pub use slice::{ChannelSlice, ImgWriteRaw, ImgWriteVis, MaskSlice, MaskSliceMut, OwnedMask};
pub use window::DisplayWindow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素物理尺寸标定.
///
/// 剖面的距离坐标 = 列索引 × `pixel_width`, 单位为 `unit`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    pixel_width: f64,
    unit: String,
}

impl Calibration {
    /// 构建标定. `pixel_width` 必须为有限正数, 否则返回 `Err`.
    pub fn new(pixel_width: f64, unit: impl Into<String>) -> Result<Self, InitSpecError> {
        if !(pixel_width.is_finite() && pixel_width > 0.0) {
            return Err(InitSpecError::NonPositivePixelSize(pixel_width));
        }
        Ok(Self {
            pixel_width,
            unit: unit.into(),
        })
    }

    /// 单个像素的水平物理尺寸.
    #[inline]
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// 物理单位名称, 例如 `"micron"`.
    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// 未标定的图像: 每像素 1.0, 单位为 `"pixel"`.
impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            unit: "pixel".to_string(),
        }
    }
}

/// 单个荧光通道. 像素值以 `f32` 保存, 按 `(h, w)` 行优先访问.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    title: String,
    data: Array2<f32>,
    calibration: Calibration,
}

impl Channel {
    /// 直接初始化.
    pub fn new(title: impl Into<String>, data: Array2<f32>, calibration: Calibration) -> Self {
        Self {
            title: title.into(),
            data,
            calibration,
        }
    }

    /// 通道标题.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 像素标定.
    #[inline]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// 获得不可变切片视图.
    #[inline]
    pub fn slice(&self) -> ChannelSlice<'_> {
        ChannelSlice::new(self.data.view())
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.data.view_mut()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.slice().shape()
    }

    /// 复制一份通道并重命名.
    pub fn duplicate(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            data: self.data.clone(),
            calibration: self.calibration.clone(),
        }
    }
}

/// 带名字的感兴趣区域 (ROI). 区域以像素索引集合表示.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roi {
    /// ROI 名称.
    pub name: String,

    /// 区域内所有像素索引 `(h, w)`.
    pub area: Area2d,
}

impl Roi {
    /// 直接初始化.
    pub fn new(name: impl Into<String>, area: Area2d) -> Self {
        Self {
            name: name.into(),
            area,
        }
    }

    /// 由左上角 `(h0, w0)` 与尺寸 `(height, width)` 构建矩形 ROI.
    pub fn rectangle(name: impl Into<String>, (h0, w0): Idx2d, (height, width): Idx2d) -> Self {
        let area = (h0..h0 + height)
            .flat_map(|h| (w0..w0 + width).map(move |w| (h, w)))
            .collect();
        Self::new(name, area)
    }
}
