/// 显示窗口, 包含下限和上限. 用于把浮点强度映射为 8-bit 灰度值.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisplayWindow {
    low: f32,
    high: f32,
}

impl DisplayWindow {
    /// 构建显示窗口.
    ///
    /// `low` 和 `high` 必须是有限值且 `low < high`, 否则返回 `None`.
    pub fn new(low: f32, high: f32) -> Option<DisplayWindow> {
        if low.is_finite() && high.is_finite() && low < high {
            Some(Self { low, high })
        } else {
            None
        }
    }

    /// 以数据中的最小值、最大值构建窗口 (非有限值被忽略).
    ///
    /// 若数据为空或所有值相等, 则返回 `None`.
    pub fn from_min_max<I: IntoIterator<Item = f32>>(it: I) -> Option<DisplayWindow> {
        let (mut low, mut high) = (f32::MAX, f32::MIN);
        for v in it.into_iter().filter(|v| v.is_finite()) {
            low = low.min(v);
            high = high.max(v);
        }
        Self::new(low, high)
    }

    /// 8-bit 图像本身的全范围 `[0, 255]`.
    #[inline]
    pub const fn full_u8() -> DisplayWindow {
        Self {
            low: 0.0,
            high: 255.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.low
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.high
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.high - self.low
    }

    /// 求在当前窗口设置下, `v` 对应的灰度图像素整数值 (0 <= value <= 255)
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, v: f32) -> Option<u8> {
        self.eval_f32(v).map(|g| g as u8)
    }

    /// 求在当前窗口设置下, `v` 对应的灰度图像素分布点 (0.0 <= value <= 255.0).
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_f32(&self, v: f32) -> Option<f32> {
        if !v.is_finite() {
            return None;
        }
        if v <= self.low {
            Some(0.0)
        } else if v >= self.high {
            Some(255.0)
        } else {
            // 255, not 256.
            Some((v - self.low) / self.width() * 255.0)
        }
    }
}
