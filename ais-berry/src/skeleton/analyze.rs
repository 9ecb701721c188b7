//! 基于像素邻域的骨架分析.

use super::{Point, SkeletonAnalysis, SkeletonGraph, Skeletonizer, VertexId};
use crate::eight::step_length;
use crate::{Idx2d, MaskSlice};
use binary_heap_plus::BinaryHeap;
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};

/// 直接在 1 像素宽骨架上工作的分析器.
///
/// 像素按 8-邻域前景个数分类:
///
/// - 不超过 1 个: 端点, 独立成为一个顶点;
/// - 恰好 2 个: slab 像素, 属于某条边;
/// - 至少 3 个: 分叉像素, 8-相邻的分叉像素合并为同一个顶点.
///
/// 每个连通分量的最长最短路径通过两次 Dijkstra 求出.
#[derive(Copy, Clone, Debug, Default)]
pub struct PixelSkeletonAnalyzer;

impl Skeletonizer for PixelSkeletonAnalyzer {
    fn analyze(&self, skeleton: MaskSlice<'_>) -> SkeletonAnalysis {
        let mut ans = SkeletonAnalysis::default();
        for area in skeleton.foreground_areas() {
            let degree: HashMap<Idx2d, usize> = area
                .iter()
                .map(|&p| (p, skeleton.n8_foreground(p).len()))
                .collect();
            ans.end_points.extend(
                area.iter()
                    .filter(|p| degree[*p] <= 1)
                    .map(|&p| point(p)),
            );
            ans.graphs.push(build_graph(skeleton, &area, &degree));
            ans.shortest_paths
                .push(longest_shortest_path(skeleton, &area, &degree));
        }
        debug!(
            "骨架分析: {} 个分量, {} 个端点",
            ans.graphs.len(),
            ans.end_points.len()
        );
        ans
    }
}

/// 图像边长远小于 `i32::MAX`.
#[inline]
fn point((h, w): Idx2d) -> Point {
    Point::xy(w as i32, h as i32)
}

#[inline]
fn step(a: Idx2d, b: Idx2d) -> f64 {
    step_length(a, b).unwrap_or(0.0)
}

fn build_graph(
    skel: MaskSlice<'_>,
    area: &[Idx2d],
    degree: &HashMap<Idx2d, usize>,
) -> SkeletonGraph {
    let mut g = SkeletonGraph::new();
    let mut vertex_of: HashMap<Idx2d, VertexId> = HashMap::new();

    for &p in area {
        if vertex_of.contains_key(&p) {
            continue;
        }
        match degree[&p] {
            2 => {}
            0 | 1 => {
                let id = g.add_vertex(vec![point(p)]);
                vertex_of.insert(p, id);
            }
            _ => {
                let mut cluster = vec![p];
                let mut seen = HashSet::from([p]);
                let mut q = VecDeque::from([p]);
                while let Some(cur) = q.pop_front() {
                    for n in skel.n8_foreground(cur) {
                        if degree[&n] >= 3 && seen.insert(n) {
                            cluster.push(n);
                            q.push_back(n);
                        }
                    }
                }
                let id = g.add_vertex(cluster.iter().map(|&c| point(c)).collect());
                vertex_of.extend(cluster.into_iter().map(|c| (c, id)));
            }
        }
    }

    let mut visited_slab = HashSet::new();
    for &v in area {
        let Some(&vid) = vertex_of.get(&v) else {
            continue;
        };
        for n in skel.n8_foreground(v) {
            if let Some(&nid) = vertex_of.get(&n) {
                // 两个不同顶点直接相邻, 每对像素只记一次.
                if nid != vid && v < n {
                    g.add_edge(vid, nid, vec![], step(v, n));
                }
                continue;
            }
            if !visited_slab.insert(n) {
                continue;
            }

            let (mut prev, mut cur) = (v, n);
            let mut slab = vec![point(n)];
            let mut length = step(v, n);
            let end = loop {
                let Some(next) = skel.n8_foreground(cur).into_iter().find(|&q| q != prev) else {
                    break None;
                };
                length += step(cur, next);
                if let Some(&eid) = vertex_of.get(&next) {
                    break Some(eid);
                }
                if !visited_slab.insert(next) {
                    break None;
                }
                slab.push(point(next));
                (prev, cur) = (cur, next);
            };
            if let Some(eid) = end {
                g.add_edge(vid, eid, slab, length);
            }
        }
    }
    g
}

/// 距离, 前驱.
type DistMap = HashMap<Idx2d, (f64, Option<Idx2d>)>;

fn dijkstra(skel: MaskSlice<'_>, source: Idx2d) -> DistMap {
    // 堆顶距离最小
    let mut heap: BinaryHeap<(f64, Idx2d), _> =
        BinaryHeap::new_by(|a: &(f64, Idx2d), b: &(f64, Idx2d)| b.0.total_cmp(&a.0));
    let mut best = DistMap::new();
    let mut done = HashSet::new();

    best.insert(source, (0.0, None));
    heap.push((0.0, source));
    while let Some((d, cur)) = heap.pop() {
        if !done.insert(cur) {
            continue;
        }
        for n in skel.n8_foreground(cur) {
            if done.contains(&n) {
                continue;
            }
            let nd = d + step(cur, n);
            if best.get(&n).map_or(true, |&(old, _)| nd < old) {
                best.insert(n, (nd, Some(cur)));
                heap.push((nd, n));
            }
        }
    }
    best
}

/// 距离相同时取 `area` 中靠前者.
fn farthest(area: &[Idx2d], dist: &DistMap) -> Idx2d {
    let mut ans = area[0];
    let mut max = f64::NEG_INFINITY;
    for p in area {
        if let Some(&(d, _)) = dist.get(p) {
            if d > max {
                max = d;
                ans = *p;
            }
        }
    }
    ans
}

fn longest_shortest_path(
    skel: MaskSlice<'_>,
    area: &[Idx2d],
    degree: &HashMap<Idx2d, usize>,
) -> Vec<Point> {
    let Some(start) = area
        .iter()
        .find(|p| degree[*p] <= 1)
        .or(area.first())
        .copied()
    else {
        return vec![];
    };
    let a = farthest(area, &dijkstra(skel, start));
    let from_a = dijkstra(skel, a);
    let b = farthest(area, &from_a);

    let mut path = vec![point(b)];
    let mut cur = b;
    while let Some(&(_, Some(prev))) = from_a.get(&cur) {
        path.push(point(prev));
        cur = prev;
    }
    path.reverse();
    path
}
