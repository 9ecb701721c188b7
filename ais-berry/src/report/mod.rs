//! 结果表.
//!
//! 每个 ROI 输出一张剖面表; 整个批次共用一张显式传递的汇总表.

use crate::centerline::Centerline;
use crate::consts::NOT_AVAILABLE;
use crate::profile::{IntensityProfile, Series};
use csv::Writer;
use std::io::Write;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 剖面表的列名.
pub const PROFILE_COLUMNS: [&str; 6] = [
    "Distance (raw)",
    "Intensity (raw)",
    "Distance (avg)",
    "Intensity (avg)",
    "Distance (trimmed)",
    "Intensity (trimmed)",
];

/// 汇总表的列名.
pub const SUMMARY_COLUMNS: [&str; 4] = ["Image", "ROI", "AIS start", "AIS length"];

#[inline]
fn f64_to_display(f: Option<f64>, missing: &str) -> String {
    match f {
        Some(f) => format!("{f:.6}"),
        None => missing.to_string(),
    }
}

/// 把剖面写成 CSV. 三组序列长度不同, 缺失的单元格留空.
pub fn write_profile_csv<W: Write>(p: &IntensityProfile, w: W) -> csv::Result<()> {
    let empty = Series::default();
    let trimmed = p.trimmed.as_ref().unwrap_or(&empty);
    let groups = [&p.raw, &p.smoothed, trimmed];
    let rows = groups.iter().map(|s| s.len()).max().unwrap_or(0);

    let mut w = Writer::from_writer(w);
    w.write_record(PROFILE_COLUMNS)?;
    for i in 0..rows {
        w.write_record(
            groups
                .iter()
                .flat_map(|s| [s.distance().get(i), s.intensity().get(i)])
                .map(|v| f64_to_display(v.copied(), "")),
        )?;
    }
    w.flush()?;
    Ok(())
}

/// 把中心线写成 `x,y` 两列的 CSV.
pub fn write_centerline_csv<W: Write>(c: &Centerline, w: W) -> csv::Result<()> {
    let mut w = Writer::from_writer(w);
    w.write_record(["x", "y"])?;
    for p in c.points() {
        w.write_record([p.x.to_string(), p.y.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// 汇总表的一行.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryRow {
    /// 图像名.
    pub image: String,
    /// ROI 名.
    pub roi: String,
    /// AIS 起点: 平滑剖面的第一个距离.
    pub ais_start: Option<f64>,
    /// AIS 长度: 平滑剖面的最大距离减去起点.
    pub ais_length: Option<f64>,
}

impl SummaryRow {
    /// 平滑剖面为空时, 起点和长度均缺失.
    pub fn new(image: impl Into<String>, roi: impl Into<String>, p: &IntensityProfile) -> Self {
        let d = p.smoothed.distance();
        let ais_start = d.first().copied();
        let ais_length = ais_start.and_then(|start| {
            d.iter()
                .copied()
                .reduce(f64::max)
                .map(|max| max - start)
        });
        Self {
            image: image.into(),
            roi: roi.into(),
            ais_start,
            ais_length,
        }
    }
}

/// 汇总表. 整个批次只创建一次, 只有调用方显式调用 [`SummaryTable::reset`] 时才清空.
#[derive(Clone, Debug, Default)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// 空表.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行.
    #[inline]
    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    /// 所有行.
    #[inline]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 清空.
    #[inline]
    pub fn reset(&mut self) {
        self.rows.clear();
    }

    /// 写成 CSV. 缺失值写作 `na`.
    pub fn write_csv<W: Write>(&self, w: W) -> csv::Result<()> {
        self.write_records(Writer::from_writer(w))
    }

    /// 保存到 `path`.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> csv::Result<()> {
        self.write_records(Writer::from_path(path)?)
    }

    fn write_records<W: Write>(&self, mut w: Writer<W>) -> csv::Result<()> {
        w.write_record(SUMMARY_COLUMNS)?;
        for r in &self.rows {
            w.write_record([
                r.image.clone(),
                r.roi.clone(),
                f64_to_display(r.ais_start, NOT_AVAILABLE),
                f64_to_display(r.ais_length, NOT_AVAILABLE),
            ])?;
        }
        w.flush()?;
        Ok(())
    }
}

impl Extend<SummaryRow> for SummaryTable {
    fn extend<I: IntoIterator<Item = SummaryRow>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}
