//! # 容量模块
//!
//! 计算一幅图像最多能容纳多少负载，并在写入前检查负载是否放得下。

use crate::codec::Termination;
use crate::constants::LENGTH_PREFIX_BITS;
use crate::container::RasterHeader;
use crate::error::{Result, StegoError};

/// 一次容量检查的结果 (单位：bit)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub requested_bits: u64,
    pub available_bits: u64,
}

/// 图像全部像素低位的总比特数。
pub fn capacity_bits(header: &RasterHeader) -> u64 {
    (header.width() as u64)
        .saturating_mul(header.height() as u64)
        .saturating_mul(header.format().bits_per_pixel() as u64)
}

/// 原始容量 (字节)：BMP 为 `w*h*6/8`，PPM 为 `w*h*3/8`，向下取整。
pub fn capacity_bytes(header: &RasterHeader) -> u64 {
    capacity_bits(header) / 8
}

/// 给定终止策略时，负载本身可以使用的比特数。
pub fn usable_bits(header: &RasterHeader, termination: Termination) -> u64 {
    let raw = capacity_bits(header);
    match termination {
        Termination::Embedded => raw.saturating_sub(LENGTH_PREFIX_BITS as u64),
        Termination::Marker => raw,
    }
}

/// 检查 `payload_len` 字节的负载能否放入图像。
///
/// 嵌入式终止策略下，请求的比特数包含 32 位长度前缀。
///
/// # Errors
///
/// 放不下时返回 `Capacity` 错误，其中包含请求与可用的比特数。
pub fn check_fits(
    payload_len: usize,
    header: &RasterHeader,
    termination: Termination,
) -> Result<CapacityReport> {
    let overhead = match termination {
        Termination::Embedded => LENGTH_PREFIX_BITS as u64,
        Termination::Marker => 0,
    };
    let report = CapacityReport {
        requested_bits: payload_len as u64 * 8 + overhead,
        available_bits: capacity_bits(header),
    };

    if report.requested_bits > report.available_bits {
        return Err(StegoError::Capacity {
            requested: report.requested_bits,
            available: report.available_bits,
        });
    }
    Ok(report)
}
