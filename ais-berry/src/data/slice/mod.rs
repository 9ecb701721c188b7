//! 二值掩膜与通道切片对象的操作.

mod core;
mod iter;
mod save;

pub use core::{ChannelSlice, MaskSlice, MaskSliceMut, OwnedMask};

pub(crate) use iter::PosIter;

pub use save::{ImgWriteRaw, ImgWriteVis};
