#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 从荧光显微图像的骨架分割中提取轴突起始段 (AIS) 中心线,
//! 并沿中心线垂直方向采样, 计算强度剖面.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 本 crate 不负责二值化策略, 也不负责骨架细化算法本身.
//!   细化后的 1 像素宽骨架、核的二值分割由导入方 (见 [`batch::ImageImporter`]) 提供.
//! 2. "空结果" (没有最短路径、没有最近核、阈值窗口为空) 一律以 `Option`
//!   表示, 不视为错误. 只有真正的运行时故障才返回 [`ProfileError`].
//!
//! # 开发计划
//!
//! ### 骨架图与分支剪枝 ✅
//!
//! 以 arena 方式存储顶点与边, 端点以坐标集合存储.
//! 剪枝会就地修改调用方显式传入的可变掩膜.
//!
//! 实现位于 `ais-berry/src/skeleton`.
//!
//! ### 中心线选取与定向 ✅
//!
//! 选取最长的最短路径, 再按两端最近的核决定方向.
//!
//! 实现位于 `ais-berry/src/centerline`.
//!
//! ### 垂直采样几何 ✅
//!
//! 每个中心线点的局部切线角度与一对垂直标记点.
//!
//! 实现位于 `ais-berry/src/centerline/ortho.rs`.
//!
//! ### 拉直、截面聚合、滑动平均、阈值裁剪 ✅
//!
//! 实现位于 `ais-berry/src/profile`.
//!
//! ### 背景扣除、叠加图、结果表 ✅
//!
//! 实现位于 `ais-berry/src/post_proc` 和 `ais-berry/src/report`.
//!
//! ### 批处理 ✅
//!
//! 单图像失败不会中断整个批次; 汇总表是显式传递的累加器.
//!
//! 实现位于 `ais-berry/src/batch`.
//!
//! ### 坐标约定
//!
//! 图像数据以 `(h, w)` 行优先存储 (即 `Idx2d`), 骨架点以 `(x, y, z)` 存储
//! (即 [`skeleton::Point`]). 两者关系为 `(h, w) == (y, x)`, y 轴向下.

/// 二维索引 `(h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 高精度通用索引 / 向量.
pub type Idx2dF = (f64, f64);

type Predicate = fn(u8) -> bool;

/// 一片像素区域.
pub type Area2d = Vec<Idx2d>;

/// 多片像素区域.
pub type Areas2d = Vec<Area2d>;

mod error;

pub use error::{InitSpecError, ProfileError, ProfileResult};

/// 图像通道、掩膜与 ROI 基础数据结构.
mod data;

pub use data::{
    Calibration, Channel, ChannelSlice, DisplayWindow, ImgWriteRaw, ImgWriteVis, MaskSlice,
    MaskSliceMut, OwnedMask, Roi,
};

pub mod consts;

pub mod eight;

pub mod skeleton;

pub mod landmark;

pub mod centerline;

pub mod profile;

pub mod post_proc;

pub mod report;

pub mod batch;

pub mod dataset;

pub mod prelude;
