//! 数据集操作.

use std::env;
use std::path::{Path, PathBuf};

mod pairs;

pub use pairs::{pair_loader, ImagePair, PairLoader};

/// 输入目录的环境变量名.
pub const INPUT_DIR_ENV: &str = "AIS_INPUT_DIR";

/// 输出目录的环境变量名.
pub const OUTPUT_DIR_ENV: &str = "AIS_OUTPUT_DIR";

/// 获取 `{用户主目录}/dataset/ais` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.push("ais");
    ans.extend(it);
    Some(ans)
}

fn dir_from_env_or_home(key: &str, sub: &str) -> Option<PathBuf> {
    match env::var(key) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with([sub]),
    }
}

/// 获取输入目录.
///
/// 1. 若环境变量 `$AIS_INPUT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/ais/input`. 无法确定主目录时返回 `None`.
#[inline]
pub fn input_dir_from_env_or_home() -> Option<PathBuf> {
    dir_from_env_or_home(INPUT_DIR_ENV, "input")
}

/// 获取输出目录.
///
/// 1. 若环境变量 `$AIS_OUTPUT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/ais/output`. 无法确定主目录时返回 `None`.
#[inline]
pub fn output_dir_from_env_or_home() -> Option<PathBuf> {
    dir_from_env_or_home(OUTPUT_DIR_ENV, "output")
}
