use ais_berry::dataset::ImagePair;
use ais_berry::prelude::*;
use ais_berry::profile::profile_centerline;
use ndarray::Array2;
use std::path::PathBuf;

fn init_logger() {
    let _ = simple_logger::init_with_level(log::Level::Debug);
}

/// 以 `x0` 为起点的 100 像素水平骨架所在位置的强度: 0 -> 100 -> 0.
fn ramp(x: usize, x0: usize) -> f32 {
    if x < x0 || x >= x0 + 100 {
        return 0.0;
    }
    let i = x - x0;
    100.0 * i.min(99 - i) as f32 / 49.0
}

fn ramp_image() -> (Channel, OwnedMask) {
    let img = Array2::from_shape_fn((21, 120), |(_, w)| ramp(w, 10));
    let skeleton = OwnedMask::from_foreground((21, 120), (10..110).map(|x| (10, x)));
    (Channel::new("ramp", img, Calibration::default()), skeleton)
}

#[test]
fn straight_ramp_is_trimmed_to_center() {
    init_logger();
    let (channel, skeleton) = ramp_image();

    let analysis = PixelSkeletonAnalyzer.analyze(skeleton.as_immut());
    let selection = select_centerline(&analysis.shortest_paths, &[]).unwrap();
    assert_eq!(selection.centerline.len(), 100);
    assert_eq!(selection.landmark, None);

    let spec = ProfileSpec::new(Method::Mean, 3, 5, 0.2, 10.0).unwrap();
    let profiled = profile_centerline(&channel, &selection.centerline, &spec, "ramp-Straight");
    let p = profiled.profile;

    assert_eq!(profiled.strip.shape(), (3, 100));
    assert_eq!(p.raw.len(), 100);
    // 尾部的零值列被去除: 99 列, 窗口 5.
    assert_eq!(p.smoothed.len(), 95);

    let threshold = p.threshold_value.unwrap();
    let peak = p.smoothed.intensity().iter().copied().fold(f64::MIN, f64::max);
    assert!((threshold - 0.2 * peak).abs() < 1e-9);
    assert!(threshold > 19.0 && threshold < 20.0);

    let t = p.trimmed.unwrap();
    assert!(t.len() < p.smoothed.len());
    assert!(t.intensity().iter().all(|&v| v >= threshold));
    // 两端的低强度尾部被排除.
    assert!(p.smoothed.intensity()[0] < threshold);
    assert!(p.smoothed.intensity()[94] < threshold);
    assert!(t.distance()[0] > p.smoothed.distance()[0]);
    assert!(t.distance()[t.len() - 1] < p.smoothed.distance()[94]);
}

/// 忽略文件内容, 按文件名合成图像. 名为 `broken` 的图像导入失败.
struct SyntheticImporter;

impl ImageImporter for SyntheticImporter {
    fn import(&self, pair: &ImagePair) -> ProfileResult<ImageJob> {
        if pair.stem == "broken" {
            return Err(ProfileError::EmptyImage);
        }
        let (channel, skeleton) = ramp_image();
        Ok(ImageJob {
            name: pair.stem.clone(),
            channels: vec![channel],
            nucleus_mask: OwnedMask::zeros((21, 120)),
            skeleton,
            rois: vec![
                Roi::rectangle("bg1", (0, 0), (2, 2)),
                Roi::rectangle("bg2", (0, 2), (2, 2)),
                Roi::rectangle("bg3", (0, 4), (2, 2)),
                Roi::rectangle("axon", (5, 0), (10, 120)),
            ],
        })
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let d = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&d);
    d
}

#[test]
fn batch_skips_broken_image_and_keeps_summary() {
    init_logger();
    let input = temp_dir("ais-berry-batch-in");
    let output = temp_dir("ais-berry-batch-out");
    std::fs::create_dir_all(&input).unwrap();
    for f in ["a.tif", "a.zip", "broken.tif", "broken.zip", "c.tif", "c.zip"] {
        std::fs::write(input.join(f), b"").unwrap();
    }

    let config = BatchConfig {
        spec: ProfileSpec::new(Method::Median, 3, 5, 0.2, 10.0).unwrap(),
        ..BatchConfig::default()
    };
    let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector::default());
    let runner = BatchRunner::new(&k, &b, config);

    let mut summary = SummaryTable::new();
    let done = runner
        .run_dir(&SyntheticImporter, &input, &output, &mut summary)
        .unwrap();
    assert_eq!(done, 2);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.rows()[0].image, "a");
    assert_eq!(summary.rows()[1].image, "c");
    assert_eq!(summary.rows()[0].roi, "axon");

    for suffix in ["Results.csv", "ROI.csv", "Straight.png", "Overlay.png"] {
        assert!(output.join(format!("a-axon-AIS-{suffix}")).is_file());
        assert!(!output.join(format!("broken-axon-AIS-{suffix}")).exists());
    }

    summary.save_csv(output.join("Summary.csv")).unwrap();
    let text = std::fs::read_to_string(output.join("Summary.csv")).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn missing_input_dir_aborts_before_output() {
    let input = temp_dir("ais-berry-batch-missing-in");
    let output = temp_dir("ais-berry-batch-missing-out");
    let (k, b) = (PixelSkeletonAnalyzer, ParticleDetector::default());
    let runner = BatchRunner::new(&k, &b, BatchConfig::default());

    let mut summary = SummaryTable::new();
    let err = runner
        .run_dir(&SyntheticImporter, &input, &output, &mut summary)
        .unwrap_err();
    assert!(matches!(err, ProfileError::MissingInputDir(_)));
    assert!(!output.exists());
    assert!(summary.is_empty());
}
