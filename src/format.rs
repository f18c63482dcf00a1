//! # 栅格格式模块
//!
//! 两种受支持容器 (BMP, PPM) 之间所有格式相关的常量都集中在这里：
//! 通道在内存中的顺序、每个像素用于隐写的位、遍历像素的顺序以及行填充策略。

use crate::constants::{BMP_ROW_ALIGNMENT, BYTES_PER_PIXEL};
use crate::error::{Result, StegoError};
use std::fmt;
use std::path::Path;

/// 颜色通道。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// 受支持的栅格容器格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Bmp,
    Ppm,
}

/// BMP 的嵌入顺序：每个通道先写次低位，再写最低位，共 6 bits。
const BMP_EMBED_ORDER: [(Channel, u8); 6] = [
    (Channel::Red, 1),
    (Channel::Red, 0),
    (Channel::Green, 1),
    (Channel::Green, 0),
    (Channel::Blue, 1),
    (Channel::Blue, 0),
];

/// PPM 的嵌入顺序：只使用每个通道的最低位，共 3 bits。
const PPM_EMBED_ORDER: [(Channel, u8); 3] =
    [(Channel::Red, 0), (Channel::Green, 0), (Channel::Blue, 0)];

impl RasterFormat {
    /// 根据文件扩展名 (不区分大小写) 选择格式。
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("bmp") => Ok(RasterFormat::Bmp),
            Some("ppm") => Ok(RasterFormat::Ppm),
            _ => Err(StegoError::unsupported(
                "image",
                format!(
                    "'{}' has an unrecognized extension, expected .bmp or .ppm",
                    path.display()
                ),
            )),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RasterFormat::Bmp => "BMP",
            RasterFormat::Ppm => "PPM",
        }
    }

    /// 一个像素内三个通道字节在内存中的排列顺序。
    pub const fn channel_order(self) -> [Channel; 3] {
        match self {
            RasterFormat::Bmp => [Channel::Blue, Channel::Green, Channel::Red],
            RasterFormat::Ppm => [Channel::Red, Channel::Green, Channel::Blue],
        }
    }

    /// 通道在像素内的字节偏移 (0..3)。
    pub fn channel_offset(self, channel: Channel) -> usize {
        self.channel_order()
            .iter()
            .position(|&c| c == channel)
            .unwrap_or_default()
    }

    /// 比特流写入像素时依次覆盖的 (通道, 位位置)。
    pub const fn embed_order(self) -> &'static [(Channel, u8)] {
        match self {
            RasterFormat::Bmp => &BMP_EMBED_ORDER,
            RasterFormat::Ppm => &PPM_EMBED_ORDER,
        }
    }

    /// 每个像素可用于隐写的位数：BMP 为 6，PPM 为 3。
    pub const fn bits_per_pixel(self) -> usize {
        self.embed_order().len()
    }

    /// 按格式规定的顺序遍历全部像素坐标。
    ///
    /// BMP 从 `y = height - 1` 向下走到 `0`，PPM 从 `0` 向上；两者行内都是 `x` 递增。
    pub fn traversal(self, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
        let bottom_up = matches!(self, RasterFormat::Bmp);
        (0..height).flat_map(move |step| {
            let y = if bottom_up { height - 1 - step } else { step };
            (0..width).map(move |x| (x, y))
        })
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// BMP 像素行在磁盘上的填充策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPadding {
    /// 每行填充到 4 字节边界 (标准 BMP)。
    #[default]
    Aligned,
    /// 假设行之间没有填充字节。
    Packed,
}

impl RowPadding {
    /// 一行像素在磁盘上占用的字节数。
    pub const fn stride(self, width: usize) -> usize {
        let row = width * BYTES_PER_PIXEL;
        match self {
            RowPadding::Aligned => row.div_ceil(BMP_ROW_ALIGNMENT) * BMP_ROW_ALIGNMENT,
            RowPadding::Packed => row,
        }
    }
}
