//! # 比特流模块
//!
//! 负载字节与比特序列之间的转换。每个字节都按最高有效位优先展开。

use crate::error::{Result, StegoError};

/// 由负载字节惰性产生的有限比特序列 (每项为 `0` 或 `1`)。
///
/// 只能按顺序消费一次。
#[derive(Debug, Clone)]
pub struct PayloadBitStream {
    bytes: Vec<u8>,
    cursor: usize,
}

impl PayloadBitStream {
    /// 仅包含负载本身的比特流。
    pub fn new(payload: &[u8]) -> Self {
        PayloadBitStream {
            bytes: payload.to_vec(),
            cursor: 0,
        }
    }

    /// 在负载前加上 32 位大端序长度前缀的比特流。
    pub fn with_length_prefix(payload: &[u8]) -> Result<Self> {
        let len = u32::try_from(payload.len()).map_err(|_| StegoError::Capacity {
            requested: payload.len() as u64 * 8,
            available: u64::from(u32::MAX) * 8,
        })?;

        let mut bytes = Vec::with_capacity(payload.len() + 4);
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(payload);
        Ok(PayloadBitStream { bytes, cursor: 0 })
    }

    /// 剩余未消费的比特数。
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.cursor
    }
}

impl Iterator for PayloadBitStream {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.cursor / 8)?;
        let bit = (byte >> (7 - self.cursor % 8)) & 1;
        self.cursor += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PayloadBitStream {}

/// 将比特序列按 8 位一组还原为字节 (最高有效位优先)。
///
/// 比特数必须是 8 的整数倍。
pub fn from_bit_stream(bits: &[u8]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(StegoError::Marker(format!(
            "bit count {} is not a whole number of bytes",
            bits.len()
        )));
    }
    Ok(pack_bits(bits))
}

/// 同 [`from_bit_stream`]，但丢弃末尾不足 8 位的残余比特。
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect()
}
