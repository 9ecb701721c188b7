use super::PosIter;
use crate::consts::gray::*;
use crate::{Area2d, Areas2d, Idx2d, Predicate};
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Ix2};
use std::collections::{HashSet, VecDeque};
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维二值掩膜.
///
/// 任何非零像素都被视为前景.
#[derive(Clone, Copy)]
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图.
    data: ArrayView2<'a, u8>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维二值掩膜.
///
/// 剪枝等就地修改操作只接受该类型, 调用方需要自行决定是否先克隆.
pub struct MaskSliceMut<'a> {
    /// 底层数据的轻量级可变视图.
    data: ArrayViewMut2<'a, u8>,
}

/// 可变方法集合.
impl<'a> MaskSliceMut<'a> {
    /// 将 `pos` 处的像素擦除为背景.
    ///
    /// 仅当该像素原本为前景时返回 `true`. 越界时什么也不做, 返回 `false`.
    #[inline]
    pub fn erase(&mut self, pos: Idx2d) -> bool {
        match self.data.get_mut(pos) {
            Some(p) if is_foreground(*p) => {
                *p = MASK_BACKGROUND;
                true
            }
            _ => false,
        }
    }

    /// 将 `it` 中的每个索引对应的像素改为 `new`. 越界索引被忽略.
    pub fn fill_batch<I: IntoIterator<Item = Idx2d>>(&mut self, it: I, new: u8) {
        for pos in it.into_iter() {
            if let Some(p) = self.data.get_mut(pos) {
                *p = new;
            }
        }
    }

    /// 将 `area` 以外的像素全部清为背景.
    ///
    /// 返回被清除的前景像素个数.
    pub fn clear_outside(&mut self, area: &[Idx2d]) -> usize {
        let keep: HashSet<Idx2d> = area.iter().copied().collect();
        let mut cnt = 0usize;
        for (pos, p) in self.data.indexed_iter_mut() {
            if !keep.contains(&pos) && is_foreground(*p) {
                *p = MASK_BACKGROUND;
                cnt += 1;
            }
        }
        cnt
    }
}

impl Index<Idx2d> for MaskSliceMut<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for MaskSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// mask 不可变方法集合.
macro_rules! impl_mask_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&u8> {
                self.data.get(pos)
            }

            /// 给定位置是否为前景. 越界时返回 `false`.
            #[inline]
            pub fn is_foreground_at(&self, pos: Idx2d) -> bool {
                matches!(self.get(pos), Some(&p) if is_foreground(p))
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                let &[h, w] = self.data.shape() else {
                    unreachable!()
                };
                (h, w)
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 统计前景像素总个数.
            #[inline]
            pub fn count_foreground(&self) -> usize {
                self.data.iter().filter(|&&p| is_foreground(p)).count()
            }

            /// 以行优先规则, 获取能迭代图像所有索引的迭代器.
            #[inline]
            pub fn pos_iter(&self) -> impl Iterator<Item = Idx2d> {
                PosIter::new(self.shape())
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &u8)> {
                self.data.indexed_iter()
            }

            /// 获得 `pos` 的 8-邻域像素索引. 保证返回的索引都不越界.
            pub fn n8_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
                crate::eight::neighbour8(pos)
                    .into_iter()
                    .filter(|p| self.check(*p))
                    .collect()
            }

            /// 获得 `pos` 的 8-邻域中的前景像素索引.
            pub fn n8_foreground(&self, pos: Idx2d) -> Vec<Idx2d> {
                crate::eight::neighbour8(pos)
                    .into_iter()
                    .filter(|p| self.is_foreground_at(*p))
                    .collect()
            }

            /// 按照 8-相邻规则获取所有满足谓词 `pred` 的区域.
            /// 区域按其第一个像素的行优先顺序排列.
            pub fn areas8(&self, pred: Predicate) -> Areas2d {
                let mut ans = Areas2d::with_capacity(1);
                let mut bfs_q = VecDeque::with_capacity(8);
                let mut set = HashSet::with_capacity(16);

                for pos in self.pos_iter() {
                    if set.contains(&pos) || !pred(self[pos]) {
                        continue;
                    }
                    set.insert(pos);
                    bfs_q.push_back(pos);
                    let mut this_area = Area2d::with_capacity(1);
                    while let Some(cur) = bfs_q.pop_front() {
                        this_area.push(cur);
                        for n in self.n8_positions(cur) {
                            if pred(self[n]) && set.insert(n) {
                                bfs_q.push_back(n);
                            }
                        }
                    }
                    ans.push(this_area);
                }
                ans
            }

            /// 按照 8-相邻规则获取所有前景区域.
            #[inline]
            pub fn foreground_areas(&self) -> Areas2d {
                self.areas8(is_foreground)
            }
        }
    };
}

impl_mask_slice_immut!('a, MaskSlice<'a>, ArrayView2<'a, u8>);
impl_mask_slice_immut!('a, MaskSliceMut<'a>, ArrayViewMut2<'a, u8>);

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 拥有所有权的二维二值掩膜.
///
/// `OwnedMask` 只负责构造, 以及到 `MaskSlice` 和 `MaskSliceMut` 的轻量转换.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedMask {
    data: Array2<u8>,
}

impl OwnedMask {
    /// 创建形状为 `(h, w)` 的全背景掩膜.
    #[inline]
    pub fn zeros((h, w): Idx2d) -> Self {
        Self {
            data: Array2::from_elem((h, w), MASK_BACKGROUND),
        }
    }

    /// 创建形状为 `shape` 的掩膜, 并将 `it` 中的像素置为前景. 越界索引被忽略.
    pub fn from_foreground<I: IntoIterator<Item = Idx2d>>(shape: Idx2d, it: I) -> Self {
        let mut ans = Self::zeros(shape);
        ans.as_mutable().fill_batch(it, MASK_FOREGROUND);
        ans
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_immut(&self) -> MaskSlice<'_> {
        MaskSlice::new(self.data.view())
    }

    /// 获得可变切片引用.
    #[inline]
    pub fn as_mutable(&mut self) -> MaskSliceMut<'_> {
        MaskSliceMut::new(self.data.view_mut())
    }
}

/// 不可变、借用的二维荧光通道切片.
#[derive(Clone, Copy)]
pub struct ChannelSlice<'a> {
    data: ArrayView2<'a, f32>,
}

impl Index<Idx2d> for ChannelSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> ChannelSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        let &[h, w] = self.data.shape() else {
            unreachable!()
        };
        (h, w)
    }

    /// 图像是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 计算由 `it` 给出的所有 (未越界) 索引对应的像素平均值.
    ///
    /// 如果没有任何合法索引, 则返回 `None`.
    pub fn mean_over<I: IntoIterator<Item = Idx2d>>(&self, it: I) -> Option<f64> {
        let mut count = 0u64;
        let mut acc = 0.0;
        for v in it.into_iter().filter_map(|pos| self.get(pos)) {
            count += 1;
            acc += *v as f64;
        }
        (count > 0).then(|| acc / count as f64)
    }
}
