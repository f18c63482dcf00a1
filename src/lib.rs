//! # raster_lsb 库
//!
//! 本库包含 BMP / PPM 图像 LSB 隐写工具的核心逻辑。

// 声明库包含的所有模块。

pub mod bits;
pub mod bmp;
pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod container;
pub mod error;
pub mod format;
pub mod handler;
pub mod marker;
pub mod pixels;
pub mod ppm;
pub mod steganography;

pub use codec::{CodecOptions, Termination};
pub use error::StegoError;
pub use format::{RasterFormat, RowPadding};
