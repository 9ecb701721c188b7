//! 批处理.
//!
//! 每张图像独立处理: 单张图像出错时记录日志并跳过, 批次继续运行,
//! 已累计的汇总表保持不变. 只有输入目录缺失这类致命错误才会中止整个批次.

use crate::centerline::{local_frames, select_centerline, LocalFrame, Selection};
use crate::consts::BACKGROUND_ROI_COUNT;
use crate::dataset::{pair_loader, ImagePair};
use crate::landmark::{BlobDetector, Landmark};
use crate::post_proc::{estimate_background, render_overlay, subtract_background};
use crate::profile::{profile_centerline, IntensityProfile, ProfileSpec, Profiled};
use crate::report::{write_centerline_csv, write_profile_csv, SummaryRow, SummaryTable};
use crate::skeleton::{prune_analysis, Skeletonizer};
use crate::{Channel, ImgWriteRaw, ImgWriteVis, OwnedMask, ProfileError, ProfileResult, Roi};
use log::{error, info, warn};
use std::fs::{self, File};
use std::path::Path;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 一张待处理的图像.
///
/// 二值化与骨架细化不在本 crate 的职责范围内, 因此核掩膜和 1 像素宽的骨架掩膜
/// 由导入方直接提供.
#[derive(Clone, Debug)]
pub struct ImageJob {
    /// 图像名.
    pub name: String,

    /// 所有通道.
    pub channels: Vec<Channel>,

    /// 细胞核二值掩膜.
    pub nucleus_mask: OwnedMask,

    /// AIS 骨架掩膜.
    pub skeleton: OwnedMask,

    /// 所有 ROI. 排在最前面的若干个用于估计背景, 其余每个框住一个 AIS.
    pub rois: Vec<Roi>,
}

/// 图像导入方式.
pub trait ImageImporter {
    /// 图像文件扩展名.
    fn image_ext(&self) -> &str {
        "tif"
    }

    /// ROI 文件扩展名.
    fn roi_ext(&self) -> &str {
        "zip"
    }

    /// 读取一对图像/ROI 文件.
    fn import(&self, pair: &ImagePair) -> ProfileResult<ImageJob>;
}

/// 批处理参数.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// AIS 通道号, 从 1 开始.
    pub ais_channel: usize,

    /// 用于估计背景的 ROI 个数.
    pub background_rois: usize,

    /// 剖面参数.
    pub spec: ProfileSpec,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            ais_channel: 1,
            background_rois: BACKGROUND_ROI_COUNT,
            spec: ProfileSpec::default(),
        }
    }
}

/// 单个 AIS ROI 的处理结果.
#[derive(Clone, Debug)]
pub struct RoiResult {
    /// ROI 名.
    pub roi: String,

    /// 结果名 `"{image}-{roi}-AIS"`, 也用作输出文件名前缀.
    pub name: String,

    /// 中心线及其关联地标.
    pub selection: Selection,

    /// 中心线逐点的局部几何.
    pub frames: Vec<LocalFrame>,

    /// 关联的细胞核, 标签已重新设置.
    pub nucleus: Option<Landmark>,

    /// 叠加图.
    pub overlay: OwnedMask,

    /// 拉直条带.
    pub strip: Channel,

    /// 强度剖面.
    pub profile: IntensityProfile,
}

/// 单张图像的处理结果.
#[derive(Clone, Debug)]
pub struct ImageOutcome {
    /// 图像名.
    pub name: String,

    /// 检测到的细胞核.
    pub landmarks: Vec<Landmark>,

    /// 扣除的背景强度.
    pub background: Option<f32>,

    /// 成功处理的 ROI, 按 ROI 顺序排列.
    pub rois: Vec<RoiResult>,

    /// 因找不到中心线而跳过的 ROI 名.
    pub skipped: Vec<String>,
}

impl ImageOutcome {
    /// 每个成功处理的 ROI 生成一行汇总.
    pub fn summary_rows(&self) -> impl Iterator<Item = SummaryRow> + '_ {
        self.rois
            .iter()
            .map(|r| SummaryRow::new(&self.name, &r.roi, &r.profile))
    }

    /// 把每个 ROI 的剖面表、中心线、拉直条带和叠加图写入 `dir`.
    pub fn write_outputs<P: AsRef<Path>>(&self, dir: P) -> ProfileResult<()> {
        let dir = dir.as_ref();
        for r in &self.rois {
            let f = File::create(dir.join(format!("{}-Results.csv", r.name)))?;
            write_profile_csv(&r.profile, f)?;

            let f = File::create(dir.join(format!("{}-ROI.csv", r.name)))?;
            write_centerline_csv(&r.selection.centerline, f)?;

            r.strip
                .slice()
                .save(dir.join(format!("{}-Straight.png", r.name)))?;
            r.overlay
                .as_immut()
                .save_raw(dir.join(format!("{}-Overlay.png", r.name)))?;
        }
        Ok(())
    }
}

/// 单张图像进入逐 ROI 处理前的公共部分.
struct Prepared {
    ais: Channel,
    landmarks: Vec<Landmark>,
    background: Option<f32>,
    first_ais_roi: usize,
}

/// 批处理器.
pub struct BatchRunner<'a, K, B> {
    skeletonizer: &'a K,
    detector: &'a B,
    config: BatchConfig,
}

impl<'a, K: Skeletonizer, B: BlobDetector> BatchRunner<'a, K, B> {
    /// 直接初始化.
    pub fn new(skeletonizer: &'a K, detector: &'a B, config: BatchConfig) -> Self {
        Self {
            skeletonizer,
            detector,
            config,
        }
    }

    /// 参数.
    #[inline]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn prepare(&self, job: &ImageJob) -> ProfileResult<Prepared> {
        let n = job.channels.len();
        let ais = self
            .config
            .ais_channel
            .checked_sub(1)
            .and_then(|i| job.channels.get(i))
            .ok_or(ProfileError::ChannelOutOfRange(self.config.ais_channel, n))?;
        if ais.slice().is_empty() {
            return Err(ProfileError::EmptyImage);
        }

        let landmarks = self.detector.detect(job.nucleus_mask.as_immut());
        let first_ais_roi = self.config.background_rois.min(job.rois.len());
        let background = estimate_background(ais.slice(), &job.rois[..first_ais_roi]);

        let mut ais = ais.duplicate(format!("{}-AIS", job.name));
        if let Some(bg) = background {
            subtract_background(&mut ais, bg);
        }
        info!(
            "{}: {} 个细胞核, 背景 {:?}, {} 个 AIS ROI",
            job.name,
            landmarks.len(),
            background,
            job.rois.len() - first_ais_roi
        );
        Ok(Prepared {
            ais,
            landmarks,
            background,
            first_ais_roi,
        })
    }

    fn finish(job: &ImageJob, p: Prepared, results: Vec<Option<RoiResult>>) -> ImageOutcome {
        let mut rois = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (roi, r) in job.rois[p.first_ais_roi..].iter().zip(results) {
            match r {
                Some(r) => rois.push(r),
                None => skipped.push(roi.name.clone()),
            }
        }
        ImageOutcome {
            name: job.name.clone(),
            landmarks: p.landmarks,
            background: p.background,
            rois,
            skipped,
        }
    }

    /// 处理单个 AIS ROI: 截取骨架、剪枝、重新分析、选取中心线、计算剖面.
    ///
    /// 找不到中心线时返回 `None`.
    pub fn profile_roi(
        &self,
        image: &str,
        ais: &Channel,
        skeleton: &OwnedMask,
        roi: &Roi,
        landmarks: &[Landmark],
    ) -> Option<RoiResult> {
        let spec = &self.config.spec;
        let name = format!("{image}-{}-AIS", roi.name);

        let mut mask = skeleton.clone();
        mask.as_mutable().clear_outside(&roi.area);
        let analysis = self.skeletonizer.analyze(mask.as_immut());
        let pruned = prune_analysis(&analysis, spec.min_branch_length(), &mut mask.as_mutable());
        let analysis = self.skeletonizer.analyze(mask.as_immut());

        let Some(selection) = select_centerline(&analysis.shortest_paths, landmarks) else {
            warn!("{name}: 没有可用的骨架路径, 跳过");
            return None;
        };
        let frames = local_frames(selection.centerline.points(), spec.sample_width());
        let overlay = render_overlay(
            ais.shape(),
            &selection.centerline,
            &frames,
            landmarks,
            selection.landmark,
        );
        let Profiled { strip, profile } =
            profile_centerline(ais, &selection.centerline, spec, format!("{name}-Straight"));
        let nucleus = selection.labelled_landmark(landmarks, &name);
        info!(
            "{name}: 剪除 {pruned} 像素, 中心线 {} 点, 关联细胞核 {:?}",
            selection.centerline.len(),
            nucleus.as_ref().map(|n| n.id())
        );

        Some(RoiResult {
            roi: roi.name.clone(),
            name,
            selection,
            frames,
            nucleus,
            overlay,
            strip,
            profile,
        })
    }

    /// 依次处理 `job` 的每一个 AIS ROI.
    pub fn run_image(&self, job: &ImageJob) -> ProfileResult<ImageOutcome> {
        let p = self.prepare(job)?;
        let results = job.rois[p.first_ais_roi..]
            .iter()
            .map(|roi| self.profile_roi(&job.name, &p.ais, &job.skeleton, roi, &p.landmarks))
            .collect();
        Ok(Self::finish(job, p, results))
    }

    /// 依次处理所有图像, 并把结果追加到 `summary`.
    ///
    /// 单张图像出错时记录日志并跳过.
    pub fn run<I>(&self, jobs: I, summary: &mut SummaryTable) -> Vec<ImageOutcome>
    where
        I: IntoIterator<Item = ProfileResult<ImageJob>>,
    {
        let mut ans = Vec::new();
        for job in jobs {
            match job.and_then(|j| self.run_image(&j)) {
                Ok(o) => {
                    summary.extend(o.summary_rows());
                    ans.push(o);
                }
                Err(e) => warn!("跳过图像: {e}"),
            }
        }
        ans
    }

    /// 处理 `input_dir` 中所有成对的图像/ROI 文件, 结果写入 `output_dir`,
    /// 汇总行追加到 `summary`. 返回成功处理的图像个数.
    ///
    /// 输入目录缺失或输出目录无法创建时立即返回错误, 不产生任何输出;
    /// 其余错误仅导致对应图像被跳过.
    pub fn run_dir<Imp, P, Q>(
        &self,
        importer: &Imp,
        input_dir: P,
        output_dir: Q,
        summary: &mut SummaryTable,
    ) -> ProfileResult<usize>
    where
        Imp: ImageImporter,
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let pairs = pair_loader(input_dir, importer.image_ext(), importer.roi_ext())
            .map_err(|e| {
                error!("批处理中止: {e}");
                e
            })?;
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let mut done = 0;
        for pair in pairs {
            let outcome = importer.import(&pair).and_then(|job| {
                let o = self.run_image(&job)?;
                o.write_outputs(output_dir)?;
                Ok(o)
            });
            match outcome {
                Ok(o) => {
                    summary.extend(o.summary_rows());
                    done += 1;
                }
                Err(e) => warn!("跳过 {}: {e}", pair.image.display()),
            }
        }
        info!("批处理完成: {done} 张图像, 汇总 {} 行", summary.len());
        Ok(done)
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl<K: Skeletonizer + Sync, B: BlobDetector + Sync> BatchRunner<'_, K, B> {
    /// 借助 `rayon`, 并行地处理 `job` 的每一个 AIS ROI. 结果仍按 ROI 顺序排列.
    pub fn par_run_image(&self, job: &ImageJob) -> ProfileResult<ImageOutcome> {
        let p = self.prepare(job)?;
        let results = job.rois[p.first_ais_roi..]
            .par_iter()
            .map(|roi| self.profile_roi(&job.name, &p.ais, &job.skeleton, roi, &p.landmarks))
            .collect();
        Ok(Self::finish(job, p, results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::ParticleDetector;
    use crate::skeleton::PixelSkeletonAnalyzer;
    use crate::Calibration;
    use ndarray::Array2;

    /// 一张 30x40 的图像: 一条水平 AIS `y = 10, x = 5..=30`,
    /// 一个位于左端附近的核, 一个位于右下角的核.
    fn job() -> ImageJob {
        let ais = Array2::from_shape_fn((30, 40), |(h, _)| if h == 10 { 50.0 } else { 2.0 });
        let left = (8..13).flat_map(|h| (0..4).map(move |w| (h, w)));
        let right = (20..25).flat_map(|h| (36..40).map(move |w| (h, w)));
        let nucleus = OwnedMask::from_foreground((30, 40), left.chain(right));
        let skeleton = OwnedMask::from_foreground((30, 40), (5..=30).map(|x| (10, x)));
        ImageJob {
            name: "img".to_string(),
            channels: vec![Channel::new("c1", ais, Calibration::default())],
            nucleus_mask: nucleus,
            skeleton,
            rois: vec![
                Roi::rectangle("bg1", (25, 0), (3, 3)),
                Roi::rectangle("bg2", (25, 10), (3, 3)),
                Roi::rectangle("bg3", (25, 20), (3, 3)),
                Roi::rectangle("ais", (5, 0), (10, 40)),
                Roi::rectangle("empty", (20, 0), (5, 5)),
            ],
        }
    }

    fn config() -> BatchConfig {
        BatchConfig {
            spec: ProfileSpec::new(crate::profile::Method::Mean, 1, 3, 0.5, 5.0).unwrap(),
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_run_image() {
        let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector { min_size: 5 });
        let runner = BatchRunner::new(&k, &b, config());
        let o = runner.run_image(&job()).unwrap();

        assert_eq!(o.background, Some(2.0));
        assert_eq!(o.landmarks.len(), 2);
        assert_eq!(o.rois.len(), 1);
        assert_eq!(o.skipped, vec!["empty".to_string()]);

        let r = &o.rois[0];
        assert_eq!(r.name, "img-ais-AIS");
        // 起点朝向细胞核.
        assert_eq!(r.selection.centerline.first().x, 5);
        let nucleus = r.nucleus.as_ref().unwrap();
        assert_eq!(nucleus.id(), 0);
        assert_eq!(nucleus.label(), Some("img-ais-AIS-nucleus-ROI"));
        // 宽度 1 的条带正好落在 AIS 上: 48 = 50 - 背景 2.
        assert!(r.profile.raw.intensity().iter().all(|&v| v == 48.0));
        assert_eq!(r.profile.raw.len(), 26);
        assert_eq!(r.strip.shape(), (1, 26));
    }

    #[test]
    fn test_channel_out_of_range() {
        let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector::default());
        let runner = BatchRunner::new(
            &k,
            &b,
            BatchConfig {
                ais_channel: 2,
                ..config()
            },
        );
        match runner.run_image(&job()) {
            Err(ProfileError::ChannelOutOfRange(2, 1)) => {}
            other => panic!("unexpected: {:?}", other.map(|o| o.name)),
        }
    }

    #[test]
    fn test_run_skips_failed_images_and_keeps_summary() {
        let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector { min_size: 5 });
        let runner = BatchRunner::new(&k, &b, config());
        let mut summary = SummaryTable::new();

        let jobs = vec![Ok(job()), Err(ProfileError::EmptyImage), Ok(job())];
        let out = runner.run(jobs, &mut summary);
        assert_eq!(out.len(), 2);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.rows()[0].ais_start, Some(1.0));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_run_image_matches_sequential() {
        let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector { min_size: 5 });
        let runner = BatchRunner::new(&k, &b, config());
        let mut job = job();
        job.rois.push(Roi::rectangle("ais-2", (5, 0), (10, 40)));

        let seq = runner.run_image(&job).unwrap();
        let par = runner.par_run_image(&job).unwrap();
        let names = |o: &ImageOutcome| o.rois.iter().map(|r| r.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&seq), names(&par));
        assert_eq!(seq.rois[1].profile, par.rois[1].profile);
        assert_eq!(seq.skipped, par.skipped);
    }

    /// 记录所有日志, 供断言使用.
    struct Capture(std::sync::Mutex<Vec<(log::Level, String)>>);

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut v) = self.0.lock() {
                v.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(std::sync::Mutex::new(Vec::new()));

    struct NoImporter;

    impl ImageImporter for NoImporter {
        fn import(&self, _: &ImagePair) -> ProfileResult<ImageJob> {
            Err(ProfileError::EmptyImage)
        }
    }

    #[test]
    fn test_missing_input_dir_logged_once() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        let input = std::env::temp_dir().join("ais-berry-run-dir-never-created");
        let output = std::env::temp_dir().join("ais-berry-run-dir-never-created-out");
        let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector::default());
        let runner = BatchRunner::new(&k, &b, config());

        let mut summary = SummaryTable::new();
        let err = runner
            .run_dir(&NoImporter, &input, &output, &mut summary)
            .unwrap_err();
        assert!(matches!(err, ProfileError::MissingInputDir(_)));

        let needle = input.display().to_string();
        let logged = CAPTURE.0.lock().unwrap();
        let hits = logged
            .iter()
            .filter(|(level, msg)| *level == log::Level::Error && msg.contains(&needle))
            .count();
        assert_eq!(hits, 1);
    }
}
