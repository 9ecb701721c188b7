//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF};

pub use crate::data::{
    Calibration, Channel, ChannelSlice, DisplayWindow, ImgWriteRaw, ImgWriteVis, MaskSlice,
    MaskSliceMut, OwnedMask, Roi,
};
pub use crate::{InitSpecError, ProfileError, ProfileResult};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
pub use crate::consts::{BACKGROUND_ROI_COUNT, NUCLEUS_MIN_SIZE};

pub use crate::centerline::{select_centerline, Centerline, LocalFrame, Selection};
pub use crate::landmark::{BlobDetector, Landmark, ParticleDetector};
pub use crate::profile::{IntensityProfile, Method, ProfileSpec, Series};
pub use crate::report::{SummaryRow, SummaryTable};
pub use crate::skeleton::{
    PixelSkeletonAnalyzer, Point, SkeletonAnalysis, SkeletonGraph, Skeletonizer,
};

pub use crate::batch::{BatchConfig, BatchRunner, ImageImporter, ImageJob, ImageOutcome, RoiResult};
pub use crate::dataset::{self, home_dataset_dir_with};
