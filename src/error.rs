//! # 错误类型模块
//!
//! 核心编解码逻辑返回的类型化错误。命令处理层再通过 `anyhow` 为其附加上下文。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 隐写核心可能产生的全部错误。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 路径不存在、不可读或不可写。
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 签名或魔数不匹配，或者文件结构被截断。
    #[error("Invalid {format} file: {reason}")]
    Format {
        format: &'static str,
        reason: String,
    },

    /// 位深度、压缩方式或 PPM 变体不受支持。
    #[error("Unsupported {format} file: {reason}")]
    UnsupportedFormat {
        format: &'static str,
        reason: String,
    },

    /// 负载超出了图像可用的位容量。
    #[error(
        "Not enough space in the image to hide the message. Required: {requested} bits, Available: {available} bits"
    )]
    Capacity { requested: u64, available: u64 },

    /// 终止标记缺失、无法解析或与图像不符。
    #[error("Termination marker error: {0}")]
    Marker(String),
}

impl StegoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StegoError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(format: &'static str, reason: impl Into<String>) -> Self {
        StegoError::Format {
            format,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(format: &'static str, reason: impl Into<String>) -> Self {
        StegoError::UnsupportedFormat {
            format,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
