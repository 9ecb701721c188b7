//! 截面聚合.

use super::Method;
use ndarray::{ArrayView1, ArrayView2, Axis};

/// 均值. 空序列返回 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// 中位数. 偶数个值时取中间两数的平均, 空序列返回 0.
///
/// `values` 会被就地排序.
pub fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sort_unstable_by(f64::total_cmp);
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// 按 `method` 聚合一组值. `values` 可能被重新排列.
pub fn aggregate(values: &mut [f64], method: Method) -> f64 {
    match method {
        Method::Mean => mean(values),
        Method::Median => median(values),
        Method::Sum => values.iter().sum(),
    }
}

#[inline]
fn aggregate_column(col: ArrayView1<f32>, method: Method) -> f64 {
    let mut values: Vec<f64> = col.iter().map(|&v| v as f64).collect();
    aggregate(&mut values, method)
}

/// 对条带的每一列做聚合, 按列顺序返回.
pub fn aggregate_columns(strip: ArrayView2<f32>, method: Method) -> Vec<f64> {
    strip
        .axis_iter(Axis(1))
        .map(|col| aggregate_column(col, method))
        .collect()
}

/// 借助 `rayon`, 并行地对条带的每一列做聚合, 按列顺序返回.
#[cfg(feature = "rayon")]
pub fn par_aggregate_columns(strip: ArrayView2<f32>, method: Method) -> Vec<f64> {
    use rayon::iter::{IntoParallelIterator, ParallelIterator};

    strip
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|col| aggregate_column(col, method))
        .collect()
}
