//! # 容器模块
//!
//! `Raster` 把一个已解析的头部和对应的像素缓冲区绑定在一起，
//! 并负责整个容器文件与内存表示之间的转换。

use crate::bmp::BmpHeader;
use crate::constants::BYTES_PER_PIXEL;
use crate::error::{Result, StegoError};
use crate::format::{RasterFormat, RowPadding};
use crate::pixels::PixelBuffer;
use crate::ppm::PpmHeader;
use std::fs;
use std::path::Path;

/// 按格式区分的头部。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterHeader {
    Bmp(BmpHeader),
    Ppm(PpmHeader),
}

impl RasterHeader {
    /// 按指定格式解析文件开头的头部。
    pub fn parse(format: RasterFormat, raw: &[u8]) -> Result<Self> {
        match format {
            RasterFormat::Bmp => BmpHeader::parse(raw).map(RasterHeader::Bmp),
            RasterFormat::Ppm => PpmHeader::parse(raw).map(RasterHeader::Ppm),
        }
    }

    pub fn format(&self) -> RasterFormat {
        match self {
            RasterHeader::Bmp(_) => RasterFormat::Bmp,
            RasterHeader::Ppm(_) => RasterFormat::Ppm,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            RasterHeader::Bmp(h) => h.width(),
            RasterHeader::Ppm(h) => h.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RasterHeader::Bmp(h) => h.height(),
            RasterHeader::Ppm(h) => h.height,
        }
    }

    pub const fn bytes_per_pixel(&self) -> usize {
        BYTES_PER_PIXEL
    }

    /// 像素数据在文件中的起始偏移。
    pub fn pixel_offset(&self) -> usize {
        match self {
            RasterHeader::Bmp(h) => h.data_offset as usize,
            RasterHeader::Ppm(h) => h.data_offset,
        }
    }
}

/// 一幅完整的栅格图像：头部 + 像素。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub header: RasterHeader,
    pub pixels: PixelBuffer,
}

impl Raster {
    /// 从容器文件的全部字节中解析图像。
    pub fn from_bytes(format: RasterFormat, raw: &[u8], padding: RowPadding) -> Result<Self> {
        let header = RasterHeader::parse(format, raw)?;
        let data = match &header {
            RasterHeader::Bmp(h) => h.read_pixels(raw, padding)?,
            RasterHeader::Ppm(h) => h.read_pixels(raw)?,
        };
        let pixels = PixelBuffer::new(format, header.width(), header.height(), data)?;
        Ok(Raster { header, pixels })
    }

    /// 序列化为容器文件字节。头部中的大小字段会按像素数据重新计算。
    pub fn to_bytes(&self, padding: RowPadding) -> Vec<u8> {
        match &self.header {
            RasterHeader::Bmp(h) => h.serialize(self.pixels.as_bytes(), padding),
            RasterHeader::Ppm(h) => h.serialize(self.pixels.as_bytes()),
        }
    }

    pub fn format(&self) -> RasterFormat {
        self.header.format()
    }
}

/// 读取原始字节，交给调用方解析。
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| StegoError::io(path, e))
}

/// 读取并解析一个容器文件，格式由扩展名决定。
pub fn read_container(path: &Path, padding: RowPadding) -> Result<Raster> {
    let format = RasterFormat::from_path(path)?;
    let raw = read_bytes(path)?;
    Raster::from_bytes(format, &raw, padding)
}

/// 序列化并写出一个容器文件。
pub fn write_container(path: &Path, raster: &Raster, padding: RowPadding) -> Result<()> {
    fs::write(path, raster.to_bytes(padding)).map_err(|e| StegoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_bytes_survive_a_parse_and_serialize() {
        let mut raw = b"P6\n2 1\n255\n".to_vec();
        raw.extend_from_slice(&[1, 2, 3, 4, 5, 6]);

        let raster = Raster::from_bytes(RasterFormat::Ppm, &raw, RowPadding::Aligned).unwrap();
        assert_eq!(raster.header.width(), 2);
        assert_eq!(raster.header.pixel_offset(), 11);
        assert_eq!(raster.to_bytes(RowPadding::Aligned), raw);
    }

    #[test]
    fn header_reports_its_format() {
        let raw = b"P6\n1 1\n255\n\0\0\0";
        let header = RasterHeader::parse(RasterFormat::Ppm, raw).unwrap();
        assert_eq!(header.format(), RasterFormat::Ppm);
        assert_eq!(header.bytes_per_pixel(), 3);
    }

    #[test]
    fn bmp_parser_rejects_ppm_bytes() {
        let raw = b"P6\n1 1\n255\n\0\0\0";
        assert!(matches!(
            Raster::from_bytes(RasterFormat::Bmp, raw, RowPadding::Aligned),
            Err(StegoError::Format { .. })
        ));
    }
}
