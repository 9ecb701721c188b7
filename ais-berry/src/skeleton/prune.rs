//! 分支剪枝.

use super::{Point, SkeletonAnalysis, SkeletonGraph};
use crate::MaskSliceMut;
use std::collections::HashSet;

/// 在 `mask` 上擦除 `graph` 中所有过短的末端分支. 返回被擦除的前景像素个数.
///
/// 一条边会被擦除, 当且仅当它至少有一个顶点是端点 (顶点的代表像素在 `end_points` 中),
/// 且其长度小于 `min_branch_length`. 擦除内容包括整个 slab 以及作为端点的顶点像素.
/// 两端都不是端点的内部分支无论多短都不会被擦除.
///
/// # 注意
///
/// `mask` 会被就地修改. 如果需要保留原图, 调用方应先克隆.
pub fn prune_branches(
    graph: &SkeletonGraph,
    end_points: &HashSet<Point>,
    min_branch_length: f64,
    mask: &mut MaskSliceMut,
) -> usize {
    let mut erased = 0usize;
    let mut erase = |p: Point, mask: &mut MaskSliceMut| {
        if let Some(pos) = p.to_idx() {
            if mask.erase(pos) {
                erased += 1;
            }
        }
    };

    for e in graph.edges() {
        let p1 = graph.vertex(e.v1()).first_point();
        let p2 = graph.vertex(e.v2()).first_point();
        let v1_end = end_points.contains(&p1);
        let v2_end = end_points.contains(&p2);
        if !(v1_end || v2_end) || e.length() >= min_branch_length {
            continue;
        }
        if v1_end {
            erase(p1, mask);
        }
        if v2_end {
            erase(p2, mask);
        }
        for &p in e.slab() {
            erase(p, mask);
        }
    }
    erased
}

/// 对 `analysis` 中的每一个骨架图运行 [`prune_branches`]. 返回被擦除的前景像素总数.
pub fn prune_analysis(
    analysis: &SkeletonAnalysis,
    min_branch_length: f64,
    mask: &mut MaskSliceMut,
) -> usize {
    analysis
        .graphs
        .iter()
        .map(|g| prune_branches(g, &analysis.end_points, min_branch_length, mask))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::prune_branches;
    use crate::skeleton::{Point, SkeletonGraph};
    use crate::OwnedMask;
    use std::collections::HashSet;

    /// T 形骨架: 主干 (0..=10, 5), 在 (5, 5) 处向上长出一根长 2 的短刺.
    ///
    /// ```text
    ///           x=5
    ///  y=3       *
    ///  y=4       *
    ///  y=5 * * * J * * * * *
    /// ```
    fn t_shape() -> (OwnedMask, SkeletonGraph, HashSet<Point>) {
        let mut pixels: Vec<(usize, usize)> = (0..=10).map(|x| (5, x)).collect();
        pixels.extend([(4, 5), (3, 5)]);
        let mask = OwnedMask::from_foreground((8, 12), pixels);

        let mut g = SkeletonGraph::new();
        let left = g.add_vertex(vec![Point::xy(0, 5)]);
        let junction = g.add_vertex(vec![Point::xy(5, 5)]);
        let right = g.add_vertex(vec![Point::xy(10, 5)]);
        let top = g.add_vertex(vec![Point::xy(5, 3)]);
        g.add_edge(left, junction, (1..5).map(|x| Point::xy(x, 5)).collect(), 5.0);
        g.add_edge(junction, right, (6..10).map(|x| Point::xy(x, 5)).collect(), 5.0);
        g.add_edge(junction, top, vec![Point::xy(5, 4)], 2.0);

        let ends = [Point::xy(0, 5), Point::xy(10, 5), Point::xy(5, 3)]
            .into_iter()
            .collect();
        (mask, g, ends)
    }

    #[test]
    fn test_prune_short_spur_only() {
        let (mut mask, g, ends) = t_shape();
        let before = mask.as_immut().count_foreground();
        let erased = prune_branches(&g, &ends, 3.0, &mut mask.as_mutable());
        assert_eq!(erased, 2);
        let m = mask.as_immut();
        assert_eq!(m.count_foreground(), before - 2);
        assert_eq!(m[(4, 5)], 0);
        assert_eq!(m[(3, 5)], 0);
        // 分叉点本身不是端点, 不会被擦除.
        assert_ne!(m[(5, 5)], 0);
    }

    #[test]
    fn test_prune_is_idempotent() {
        let (mut mask, g, ends) = t_shape();
        prune_branches(&g, &ends, 3.0, &mut mask.as_mutable());
        let once = mask.clone();
        let erased = prune_branches(&g, &ends, 3.0, &mut mask.as_mutable());
        assert_eq!(erased, 0);
        assert_eq!(once, mask);
    }

    #[test]
    fn test_interior_branch_never_pruned() {
        let mut mask = OwnedMask::from_foreground((3, 5), (0..5).map(|x| (1, x)));
        let mut g = SkeletonGraph::new();
        let a = g.add_vertex(vec![Point::xy(1, 1)]);
        let b = g.add_vertex(vec![Point::xy(3, 1)]);
        g.add_edge(a, b, vec![Point::xy(2, 1)], 2.0);
        // 两个顶点都不是端点.
        let ends = [Point::xy(0, 1), Point::xy(4, 1)].into_iter().collect();
        assert_eq!(prune_branches(&g, &ends, 100.0, &mut mask.as_mutable()), 0);
        assert_eq!(mask.as_immut().count_foreground(), 5);
    }

    #[test]
    fn test_empty_graph_leaves_mask_unchanged() {
        let mut mask = OwnedMask::from_foreground((2, 2), [(0, 0)]);
        let before = mask.clone();
        let g = SkeletonGraph::new();
        assert_eq!(prune_branches(&g, &HashSet::new(), 10.0, &mut mask.as_mutable()), 0);
        assert_eq!(before, mask);
    }
}
