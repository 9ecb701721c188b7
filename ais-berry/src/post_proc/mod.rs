//! 剖面计算前后的辅助处理: 背景扣除与叠加图绘制.

mod background;
mod overlay;

pub use background::{estimate_background, subtract_background};
pub use overlay::{angle_code, render_overlay};
