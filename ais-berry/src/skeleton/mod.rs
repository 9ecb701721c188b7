//! 骨架图.
//!
//! 骨架图天然是无向、可能成环的结构. 这里用 arena 方式存储: 顶点和边都保存在
//! `Vec` 中并以下标 ([`VertexId`], [`EdgeId`]) 互相引用, 端点以坐标集合存储,
//! 便于做成员判断.

mod analyze;
mod prune;

pub use analyze::PixelSkeletonAnalyzer;
pub use prune::{prune_analysis, prune_branches};

use crate::{Idx2d, MaskSlice};
use num::ToPrimitive;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 顶点在 [`SkeletonGraph`] 中的下标.
pub type VertexId = usize;

/// 边在 [`SkeletonGraph`] 中的下标.
pub type EdgeId = usize;

/// 整数像素坐标 `(x, y, z)`. 二维图像中 `z` 恒为 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// 水平方向, 向右增长.
    pub x: i32,
    /// 垂直方向, 向下增长.
    pub y: i32,
    /// 层.
    pub z: i32,
}

impl Point {
    /// 直接初始化.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// 初始化二维点.
    #[inline]
    pub const fn xy(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// `(h, w)` -> `(x, y, 0)`. 坐标无法用 `i32` 表示时返回 `None`.
    #[inline]
    pub fn from_idx((h, w): Idx2d) -> Option<Self> {
        Some(Self::xy(w.to_i32()?, h.to_i32()?))
    }

    /// `(x, y)` -> `(h, w)`. 存在负分量时返回 `None`.
    #[inline]
    pub fn to_idx(&self) -> Option<Idx2d> {
        Some((self.y.to_usize()?, self.x.to_usize()?))
    }

    /// 到 `(x, y)` 的二维欧几里得距离.
    #[inline]
    pub fn distance_to(&self, (x, y): (f64, f64)) -> f64 {
        ((self.x as f64 - x).powi(2) + (self.y as f64 - y).powi(2)).sqrt()
    }
}

/// 骨架图顶点. 相邻的分叉像素会被合并为同一个顶点, 因此一个顶点可能包含多个像素.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    points: Vec<Point>,
}

impl Vertex {
    /// 顶点包含的全部像素.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// 顶点的代表像素 (第一个像素).
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }
}

/// 骨架图的边 (分支). 对核心算法只读.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    v1: VertexId,
    v2: VertexId,
    /// 两个顶点之间按顺序排列的像素, 不包括顶点本身.
    slab: Vec<Point>,
    length: f64,
}

impl Edge {
    /// 第一个顶点.
    #[inline]
    pub fn v1(&self) -> VertexId {
        self.v1
    }

    /// 第二个顶点.
    #[inline]
    pub fn v2(&self) -> VertexId {
        self.v2
    }

    /// 顶点之间的像素序列.
    #[inline]
    pub fn slab(&self) -> &[Point] {
        &self.slab
    }

    /// 欧几里得长度 (单位: 像素).
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }
}

/// 一个连通骨架分量对应的图.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkeletonGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl SkeletonGraph {
    /// 创建空图.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个顶点, 返回其下标.
    ///
    /// `points` 不能为空, 否则程序 panic.
    pub fn add_vertex(&mut self, points: Vec<Point>) -> VertexId {
        assert!(!points.is_empty(), "顶点至少包含一个像素");
        self.vertices.push(Vertex { points });
        self.vertices.len() - 1
    }

    /// 加入一条边, 返回其下标.
    ///
    /// 如果 `v1` 或 `v2` 不是已有顶点, 则程序 panic.
    pub fn add_edge(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        slab: Vec<Point>,
        length: f64,
    ) -> EdgeId {
        assert!(v1 < self.vertices.len() && v2 < self.vertices.len());
        self.edges.push(Edge {
            v1,
            v2,
            slab,
            length,
        });
        self.edges.len() - 1
    }

    /// 获取顶点.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// 获取边.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// 所有顶点.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// 所有边.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 是否没有任何边.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// 骨架分析结果.
#[derive(Clone, Debug, Default)]
pub struct SkeletonAnalysis {
    /// 每个连通骨架分量一个图.
    pub graphs: Vec<SkeletonGraph>,

    /// 所有骨架端点.
    pub end_points: HashSet<Point>,

    /// 每个连通骨架分量的最长最短路径 (按路径顺序排列的像素).
    pub shortest_paths: Vec<Vec<Point>>,
}

/// 骨架分析器: 给定 (已细化的) 二值骨架掩膜, 生成骨架图、端点和最长最短路径.
pub trait Skeletonizer {
    /// 分析 `skeleton`.
    fn analyze(&self, skeleton: MaskSlice<'_>) -> SkeletonAnalysis;
}
