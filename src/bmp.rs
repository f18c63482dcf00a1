//! # BMP 头部编解码模块
//!
//! 14 字节文件头 + 40 字节信息头，全部为小端序。
//! 只接受无压缩的 24 位位图。

use crate::constants::{
    BMP_BIT_COUNT, BMP_COMPRESSION_RGB, BMP_FILE_HEADER_SIZE, BMP_HEADER_SIZE,
    BMP_INFO_HEADER_SIZE, BMP_SIGNATURE, BYTES_PER_PIXEL,
};
use crate::error::{Result, StegoError};
use crate::format::RowPadding;

const NAME: &str = "BMP";

/// BMP 文件头与信息头中的全部字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub reserved: u32,
    pub data_offset: u32,
    pub info_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32_le(bytes: &[u8], offset: usize) -> i32 {
    read_u32_le(bytes, offset) as i32
}

impl BmpHeader {
    /// 解析文件开头的 54 字节头部并校验格式。
    ///
    /// # Errors
    ///
    /// * 数据不足 54 字节或签名不是 `BM` 时返回 `Format` 错误。
    /// * 位深度不是 24、存在压缩或尺寸非正时返回 `UnsupportedFormat` 错误。
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < BMP_HEADER_SIZE {
            return Err(StegoError::format(
                NAME,
                format!(
                    "header is truncated: {} bytes, expected at least {}",
                    raw.len(),
                    BMP_HEADER_SIZE
                ),
            ));
        }

        let signature = read_u16_le(raw, 0);
        if signature != BMP_SIGNATURE {
            return Err(StegoError::format(
                NAME,
                format!("signature {signature:#06x} does not match {BMP_SIGNATURE:#06x}"),
            ));
        }

        let info = &raw[BMP_FILE_HEADER_SIZE..];
        let header = BmpHeader {
            file_size: read_u32_le(raw, 2),
            reserved: read_u32_le(raw, 6),
            data_offset: read_u32_le(raw, 10),
            info_size: read_u32_le(info, 0),
            width: read_i32_le(info, 4),
            height: read_i32_le(info, 8),
            planes: read_u16_le(info, 12),
            bit_count: read_u16_le(info, 14),
            compression: read_u32_le(info, 16),
            image_size: read_u32_le(info, 20),
            x_pixels_per_meter: read_i32_le(info, 24),
            y_pixels_per_meter: read_i32_le(info, 28),
            colors_used: read_u32_le(info, 32),
            colors_important: read_u32_le(info, 36),
        };

        if header.bit_count != BMP_BIT_COUNT || header.compression != BMP_COMPRESSION_RGB {
            return Err(StegoError::unsupported(
                NAME,
                format!(
                    "only uncompressed 24-bit bitmaps are supported (bit count {}, compression {})",
                    header.bit_count, header.compression
                ),
            ));
        }
        if header.width <= 0 || header.height <= 0 {
            return Err(StegoError::unsupported(
                NAME,
                format!(
                    "dimensions {}x{} are not supported, width and height must be positive",
                    header.width, header.height
                ),
            ));
        }

        Ok(header)
    }

    pub fn width(&self) -> u32 {
        self.width.unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        self.height.unsigned_abs()
    }

    /// 从整个文件中取出像素数据，去掉行填充。
    pub fn read_pixels(&self, raw: &[u8], padding: RowPadding) -> Result<Vec<u8>> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let row = width * BYTES_PER_PIXEL;
        let stride = padding.stride(width);
        let start = self.data_offset as usize;

        let needed = stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(start))
            .and_then(|n| n.checked_add(row))
            .ok_or_else(|| {
                StegoError::format(NAME, format!("dimensions {width}x{height} are too large"))
            })?;
        if raw.len() < needed {
            return Err(StegoError::format(
                NAME,
                format!(
                    "pixel data is truncated: file has {} bytes, expected at least {}",
                    raw.len(),
                    needed
                ),
            ));
        }

        let mut pixels = Vec::with_capacity(row * height);
        for r in 0..height {
            let from = start + r * stride;
            pixels.extend_from_slice(&raw[from..from + row]);
        }
        Ok(pixels)
    }

    /// 序列化头部与像素数据。
    ///
    /// 平面数、位深度和压缩方式总是写为 1 / 24 / 0，
    /// 文件大小、数据偏移和图像大小根据实际写出的像素数据重新计算。
    pub fn serialize(&self, pixels: &[u8], padding: RowPadding) -> Vec<u8> {
        let width = self.width() as usize;
        let row = width * BYTES_PER_PIXEL;
        let stride = padding.stride(width);
        let rows = if row == 0 { 0 } else { pixels.len() / row };
        let image_size = stride * rows;

        let mut out = Vec::with_capacity(BMP_HEADER_SIZE + image_size);
        out.extend_from_slice(&BMP_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&((BMP_HEADER_SIZE + image_size) as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes());

        out.extend_from_slice(&(BMP_INFO_HEADER_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&BMP_BIT_COUNT.to_le_bytes());
        out.extend_from_slice(&BMP_COMPRESSION_RGB.to_le_bytes());
        out.extend_from_slice(&(image_size as u32).to_le_bytes());
        out.extend_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.colors_used.to_le_bytes());
        out.extend_from_slice(&self.colors_important.to_le_bytes());

        for line in pixels.chunks_exact(row.max(1)) {
            out.extend_from_slice(line);
            out.resize(out.len() + (stride - row), 0);
        }
        out
    }
}
