//! # 终止标记模块
//!
//! 标记模式下，编码停止时的遍历位置以十进制文本保存在一个辅助文件中，
//! 下一次解码读取并清空它。同一时刻只支持一个未被消费的标记。

use crate::error::{Result, StegoError};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 保存单个整数标记的辅助记录文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRecord {
    path: PathBuf,
}

impl MarkerRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MarkerRecord { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已记录的标记。
    ///
    /// # Errors
    ///
    /// * 记录文件不存在或为空时返回 `Marker` 错误。
    /// * 内容不是一个十进制整数时返回 `Marker` 错误。
    pub fn read(&self) -> Result<usize> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StegoError::io(&self.path, e)),
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(StegoError::Marker(format!(
                "no termination marker recorded in '{}'",
                self.path.display()
            )));
        }

        text.parse::<usize>().map_err(|_| {
            StegoError::Marker(format!(
                "'{}' in '{}' is not a valid termination marker",
                text,
                self.path.display()
            ))
        })
    }

    /// 写入新的标记，覆盖旧记录。
    pub fn write(&self, position: usize) -> Result<()> {
        if let Ok(previous) = self.read() {
            warn!(
                "Overwriting unconsumed termination marker {} in '{}'",
                previous,
                self.path.display()
            );
        }
        debug!("Recording termination marker {} in '{}'", position, self.path.display());
        fs::write(&self.path, position.to_string()).map_err(|e| StegoError::io(&self.path, e))
    }

    /// 清空记录。
    pub fn clear(&self) -> Result<()> {
        fs::write(&self.path, "").map_err(|e| StegoError::io(&self.path, e))
    }

    /// 读取并清空标记，每个标记只能被消费一次。
    pub fn take(&self) -> Result<usize> {
        let position = self.read();
        if self.path.exists() {
            self.clear()?;
        }
        position
    }
}
