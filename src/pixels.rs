//! # 像素缓冲区模块
//!
//! `PixelBuffer` 持有一幅栅格图像的全部通道字节 (无行填充)，
//! 并通过 (x, y, channel) 访问器集中处理线性偏移的计算。

use crate::constants::BYTES_PER_PIXEL;
use crate::error::{Result, StegoError};
use crate::format::{Channel, RasterFormat};

/// 像素 `(x, y)` 第一个通道字节的线性偏移：`(x + y * width) * 3`。
///
/// 坐标越界时返回 `None`。
pub fn index_of(width: u32, height: u32, x: u32, y: u32) -> Option<usize> {
    if x >= width || y >= height {
        return None;
    }
    (y as usize)
        .checked_mul(width as usize)
        .and_then(|n| n.checked_add(x as usize))
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
}

/// 一幅图像的通道字节，顺序与所属容器格式一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    format: RasterFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// 用已有字节构造缓冲区，长度必须恰好是 `width * height * 3`。
    pub fn new(format: RasterFormat, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| {
                StegoError::format(format.name(), format!("dimensions {width}x{height} are too large"))
            })?;
        if data.len() != expected {
            return Err(StegoError::format(
                format.name(),
                format!(
                    "pixel buffer holds {} bytes, expected {} for {}x{}",
                    data.len(),
                    expected,
                    width,
                    height
                ),
            ));
        }
        Ok(PixelBuffer {
            format,
            width,
            height,
            data,
        })
    }

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 指定通道字节的线性偏移。
    pub fn offset(&self, x: u32, y: u32, channel: Channel) -> Option<usize> {
        index_of(self.width, self.height, x, y).map(|base| base + self.format.channel_offset(channel))
    }

    pub fn channel(&self, x: u32, y: u32, channel: Channel) -> Option<u8> {
        self.offset(x, y, channel).map(|i| self.data[i])
    }

    pub fn channel_mut(&mut self, x: u32, y: u32, channel: Channel) -> Option<&mut u8> {
        self.offset(x, y, channel).map(move |i| &mut self.data[i])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
