//! 图像的持久化存储.

use crate::{ChannelSlice, DisplayWindow, MaskSlice, MaskSliceMut};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 `MaskSlice`, `MaskSliceMut` 这类二值掩膜, 前景一律保存为白色;
/// 对于 `ChannelSlice` 这类浮点强度图, 保存时以数据自身的最小/最大值规范化到 8-bit.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// 叠加图 (见 [`crate::post_proc::render_overlay`]) 的像素值本身带有编码信息,
/// 应当按原样保存.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(pix: u8) -> u8 {
    use crate::consts::gray::*;
    if is_foreground(pix) {
        WHITE
    } else {
        BLACK
    }
}

macro_rules! impl_mask_vis {
    ($($slice: ty),+) => {
        $(
            /// 会将前景/背景像素分别映射为白色/黑色.
            impl ImgWriteVis for $slice {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_mask_raw {
    ($($slice: ty),+) => {
        $(
            /// 按原样存储.
            impl ImgWriteRaw for $slice {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_mask_vis!(MaskSlice<'_>, MaskSliceMut<'_>);
impl_mask_raw!(MaskSlice<'_>, MaskSliceMut<'_>);

/// 以数据的最小/最大值为窗口; 全常数图像退化为 `[0, 255]` 窗口.
impl ImgWriteVis for ChannelSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let window =
            DisplayWindow::from_min_max(self.iter().copied()).unwrap_or(DisplayWindow::full_u8());
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            let gray = window.eval(v).unwrap_or(0);
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf.save(path)
    }
}
