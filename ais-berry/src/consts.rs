//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 二值掩膜中背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值掩膜中前景的像素值.
    pub const MASK_FOREGROUND: u8 = 255;

    /// 叠加图中, 与中心线关联的核的填充值.
    pub const NUCLEUS_ASSOCIATED: u8 = 128;

    /// 叠加图中, 其它核的填充值.
    pub const NUCLEUS_OTHER: u8 = 255;

    /// 叠加图中, 垂直标记点的像素值.
    pub const ORTHOGONAL_MARK: u8 = 255;

    /// 叠加图中, 中心线点的角度编码基值. 像素值为 `基值 + 角度 / 2`.
    pub const ANGLE_CODE_BASE: f64 = 33.0;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是前景? 任何非零值都被视为前景.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != MASK_BACKGROUND
    }
}

/// 每个图像中, 排在最前面的用于估计背景的 ROI 个数.
pub const BACKGROUND_ROI_COUNT: usize = 3;

/// 核检测的最小面积 (像素数).
pub const NUCLEUS_MIN_SIZE: usize = 20;

/// 汇总表中缺失值的占位符.
pub const NOT_AVAILABLE: &str = "na";
