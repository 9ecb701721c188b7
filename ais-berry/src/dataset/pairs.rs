//! 图像/ROI 文件配对.
//!
//! 提供迭代器风格的数据集获取模式.

use crate::{ProfileError, ProfileResult};
use std::fs;
use std::path::{Path, PathBuf};

/// 一对同名 (不同扩展名) 的图像文件与 ROI 文件.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePair {
    /// 不含扩展名的文件名.
    pub stem: String,
    /// 图像文件路径.
    pub image: PathBuf,
    /// ROI 文件路径.
    pub roi: PathBuf,
}

/// 列出 `dir` 下所有存在同名 `<stem>.<roi_ext>` 文件的 `<stem>.<img_ext>` 图像,
/// 按文件名排序. 扩展名比较忽略大小写.
///
/// # 注意
///
/// `dir` 不存在或不是目录时返回 [`ProfileError::MissingInputDir`].
/// 这是致命错误, 调用方应当在产生任何输出之前中止.
pub fn pair_loader<P: AsRef<Path>>(
    dir: P,
    img_ext: &str,
    roi_ext: &str,
) -> ProfileResult<PairLoader> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ProfileError::MissingInputDir(dir.to_owned()));
    }

    let ext_is = |p: &Path, ext: &str| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    };

    let mut data = Vec::new();
    for entry in fs::read_dir(dir)? {
        let image = entry?.path();
        if !image.is_file() || !ext_is(&image, img_ext) {
            continue;
        }
        let Some(stem) = image.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
            continue;
        };
        let roi = image.with_extension(roi_ext);
        if roi.is_file() {
            data.push(ImagePair { stem, image, roi });
        }
    }
    data.sort_by(|a, b| b.image.cmp(&a.image));
    Ok(PairLoader { data_rev: data })
}

/// 图像/ROI 文件对加载器.
#[derive(Debug)]
pub struct PairLoader {
    data_rev: Vec<ImagePair>,
}

impl Iterator for PairLoader {
    type Item = ImagePair;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.data_rev.pop()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for PairLoader {}
