//! 模块参数

use log::warn;
use vfs::{FsError, chrdev_major};

/// 默认缓冲区容量（字节）
pub const DEFAULT_CAPACITY: usize = 1024;

/// simplechar 的模块参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplecharConfig {
    /// 主设备号；0 表示动态分配
    pub major: u32,
    /// 缓冲区容量
    pub capacity: usize,
}

impl Default for SimplecharConfig {
    fn default() -> Self {
        Self {
            major: 0,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl SimplecharConfig {
    /// 从内核命令行解析参数
    ///
    /// 只识别 `simplechar.major=<n>` 与 `simplechar.capacity=<n>`，
    /// 其余单词忽略。未给出的参数取默认值。
    pub fn from_cmdline(cmdline: &str) -> Result<Self, FsError> {
        let mut config = Self::default();
        for word in cmdline.split_whitespace() {
            let Some(param) = word.strip_prefix("simplechar.") else {
                continue;
            };
            let (key, value) = param.split_once('=').ok_or(FsError::InvalidArgument)?;
            match key {
                "major" => config.major = value.parse().map_err(|_| FsError::InvalidArgument)?,
                "capacity" => {
                    config.capacity = value.parse().map_err(|_| FsError::InvalidArgument)?
                }
                _ => warn!("simplechar: unknown parameter '{}'", key),
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// 检查参数取值范围
    pub fn validate(&self) -> Result<(), FsError> {
        if self.capacity == 0 || self.major >= chrdev_major::MAX {
            return Err(FsError::InvalidArgument);
        }
        Ok(())
    }
}
