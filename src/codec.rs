//! # 编解码流程模块
//!
//! 把头部解析、容量检查、比特写入/读取以及终止标记组合成完整的一次性流程：
//! 读取头部 → 校验格式 → 读取像素 → 写入/读取比特 → 写出图像与标记 / 返回负载。
//! 任何一步失败都直接返回错误，不会写出部分结果。

use crate::bits::{PayloadBitStream, from_bit_stream, pack_bits};
use crate::capacity::{CapacityReport, capacity_bits, check_fits};
use crate::constants::{DEFAULT_MARKER_FILE, LENGTH_PREFIX_BITS};
use crate::container::{Raster, RasterHeader, read_bytes, read_container, write_container};
use crate::error::{Result, StegoError};
use crate::format::{RasterFormat, RowPadding};
use crate::marker::MarkerRecord;
use crate::steganography::{embed, extract, lsb_bits};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// 解码端如何得知负载在哪里结束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// 负载前写入 32 位长度前缀。
    #[default]
    Embedded,
    /// 遍历停止位置保存在外部的标记记录中。
    Marker,
}

/// 一次编解码操作的全部可调参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    pub termination: Termination,
    pub padding: RowPadding,
    pub marker: MarkerRecord,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            termination: Termination::default(),
            padding: RowPadding::default(),
            marker: MarkerRecord::new(DEFAULT_MARKER_FILE),
        }
    }
}

/// 编码成功后的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOutcome {
    /// 遍历停止的位置 (已写入的像素个数)。
    pub position: usize,
    pub report: CapacityReport,
}

/// `info` 所需的头部信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterInfo {
    pub header: RasterHeader,
    pub file_size: u64,
}

/// 在内存中的图像上写入负载，返回遍历停止的位置与容量检查结果。
pub fn encode_raster(
    raster: &mut Raster,
    payload: &[u8],
    termination: Termination,
) -> Result<EncodeOutcome> {
    let report = check_fits(payload.len(), &raster.header, termination)?;

    let stream = match termination {
        Termination::Embedded => PayloadBitStream::with_length_prefix(payload)?,
        Termination::Marker => PayloadBitStream::new(payload),
    };
    debug!(
        "Embedding {} bits into a {}x{} {} raster",
        stream.len(),
        raster.header.width(),
        raster.header.height(),
        raster.format()
    );
    let position = embed(&mut raster.pixels, stream)?;
    Ok(EncodeOutcome { position, report })
}

/// 读取长度前缀，再读取对应数量的负载比特。
pub fn decode_embedded(raster: &Raster) -> Result<Vec<u8>> {
    let mut bits = lsb_bits(&raster.pixels);

    let prefix: Vec<u8> = bits.by_ref().take(LENGTH_PREFIX_BITS).collect();
    let prefix: [u8; 4] = pack_bits(&prefix).try_into().map_err(|_| {
        StegoError::Marker("image is too small to carry a length prefix".to_string())
    })?;
    let len = u32::from_be_bytes(prefix) as u64;

    let available = capacity_bits(&raster.header) - LENGTH_PREFIX_BITS as u64;
    if len * 8 > available {
        return Err(StegoError::Marker(format!(
            "length prefix claims {} bytes but only {} fit; the image may not contain a hidden message",
            len,
            available / 8
        )));
    }

    let body: Vec<u8> = bits.take(len as usize * 8).collect();
    from_bit_stream(&body)
}

/// 读取遍历顺序中前 `position` 个像素携带的负载，末尾不足一个字节的比特被丢弃。
pub fn decode_marked(raster: &Raster, position: usize) -> Result<Vec<u8>> {
    let bits = extract(&raster.pixels, position)?;
    Ok(pack_bits(&bits))
}

/// 把负载写入 `src`，结果保存到 `dest`。标记模式下随后写入终止标记。
pub fn encode_file(
    src: &Path,
    dest: &Path,
    payload: &[u8],
    options: &CodecOptions,
) -> Result<EncodeOutcome> {
    debug!("Reading container '{}'", src.display());
    let mut raster = read_container(src, options.padding)?;
    let outcome = encode_raster(&mut raster, payload, options.termination)?;

    debug!("Writing container '{}'", dest.display());
    write_container(dest, &raster, options.padding)?;
    if options.termination == Termination::Marker {
        if let Err(e) = options.marker.write(outcome.position) {
            // 没有标记的结果图像无法解码
            if let Err(remove) = fs::remove_file(dest) {
                warn!("Unable to remove '{}': {}", dest.display(), remove);
            }
            return Err(e);
        }
    }

    Ok(outcome)
}

/// 从 `path` 中恢复负载。标记模式下先读取并清空终止标记。
pub fn decode_file(path: &Path, options: &CodecOptions) -> Result<Vec<u8>> {
    let position = match options.termination {
        Termination::Marker => Some(options.marker.take()?),
        Termination::Embedded => None,
    };

    debug!("Reading container '{}'", path.display());
    let raster = read_container(path, options.padding)?;

    match position {
        Some(position) => decode_marked(&raster, position),
        None => decode_embedded(&raster),
    }
}

/// 只检查容量，不修改任何文件。
pub fn check_file(path: &Path, payload_len: usize, options: &CodecOptions) -> Result<CapacityReport> {
    let raster = read_container(path, options.padding)?;
    check_fits(payload_len, &raster.header, options.termination)
}

/// 只解析头部。
pub fn inspect_file(path: &Path) -> Result<RasterInfo> {
    let format = RasterFormat::from_path(path)?;
    let raw = read_bytes(path)?;
    let header = RasterHeader::parse(format, &raw)?;
    Ok(RasterInfo {
        header,
        file_size: raw.len() as u64,
    })
}
