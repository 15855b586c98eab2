//! 调试信息快照

use core::ffi::{c_int, c_ulong};
use core::fmt;

use uapi::simplechar::SimplecharDebugInfo;

/// 设备计数的一次一致快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevStatus {
    /// 数据高水位
    pub size: usize,
    /// 最近一次成功写入后的位置
    pub last_write_pos: usize,
    /// 当前打开的会话数
    pub open_count: usize,
}

impl From<DevStatus> for SimplecharDebugInfo {
    fn from(status: DevStatus) -> Self {
        let mut info = SimplecharDebugInfo::new();
        info.size = status.size as c_ulong;
        info.last_write_pos = status.last_write_pos as c_ulong;
        info.open_count = c_int::try_from(status.open_count).unwrap_or(c_int::MAX);
        info
    }
}

impl fmt::Display for DevStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Debug Info:")?;
        writeln!(f, "  Buffer size: {} bytes", self.size)?;
        writeln!(f, "  Last write position: {}", self.last_write_pos)?;
        write!(f, "  Open count: {}", self.open_count)
    }
}
