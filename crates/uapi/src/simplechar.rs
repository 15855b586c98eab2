//! simplechar 设备的用户可见定义

use core::ffi::{c_int, c_ulong};
use core::mem::size_of;

use crate::ioctl::ior;

/// 设备名，同时用作设备号区域名、设备类名和 `/dev` 节点名
pub const SIMPLECHAR_NAME: &str = "simplechar";

/// ioctl 魔数
pub const SIMPLECHAR_IOC_MAGIC: u8 = b'S';

/// 读取调试信息：`_IOR('S', 0, struct simplechar_debug_info)`
pub const SIMPLECHAR_IOC_GETDEBUG: u32 = ior(
    SIMPLECHAR_IOC_MAGIC,
    0,
    size_of::<SimplecharDebugInfo>(),
);

/// 调试信息
/// 对应用户程序中的 `struct simplechar_debug_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplecharDebugInfo {
    /// 已写入数据的高水位
    pub size: c_ulong,
    /// 最近一次成功写入后的文件位置
    pub last_write_pos: c_ulong,
    /// 当前打开的会话数
    pub open_count: c_int,
}

impl SimplecharDebugInfo {
    /// 创建一个所有字段（包括尾部 padding）为零的实例
    pub fn new() -> Self {
        // SAFETY: all-zero is a valid bit-pattern, and it ensures we don't
        // leak uninitialized padding to userspace when copying out.
        unsafe { core::mem::zeroed() }
    }

    /// 按 C 布局取出原始字节，用于拷贝到用户空间
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: repr(C) 的 POD 结构体；padding 在 new() 中已清零
        unsafe {
            core::slice::from_raw_parts(self as *const Self as *const u8, size_of::<Self>())
        }
    }
}

impl Default for SimplecharDebugInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ioctl::{IOC_READ, ioc_dir, ioc_nr, ioc_size, ioc_type};

    #[test]
    fn test_getdebug_request_layout() {
        assert_eq!(ioc_dir(SIMPLECHAR_IOC_GETDEBUG), IOC_READ);
        assert_eq!(ioc_type(SIMPLECHAR_IOC_GETDEBUG), b'S');
        assert_eq!(ioc_nr(SIMPLECHAR_IOC_GETDEBUG), 0);
        assert_eq!(
            ioc_size(SIMPLECHAR_IOC_GETDEBUG),
            size_of::<SimplecharDebugInfo>()
        );
    }

    #[test]
    fn test_field_order_in_bytes() {
        let mut info = SimplecharDebugInfo::new();
        info.size = 5;
        info.last_write_pos = 5;
        info.open_count = 1;

        let bytes = info.as_bytes();
        let ul = size_of::<c_ulong>();
        assert_eq!(bytes.len(), size_of::<SimplecharDebugInfo>());
        assert_eq!(&bytes[..ul], &(5 as c_ulong).to_ne_bytes());
        assert_eq!(&bytes[ul..2 * ul], &(5 as c_ulong).to_ne_bytes());
        assert_eq!(&bytes[2 * ul..2 * ul + 4], &1i32.to_ne_bytes());
        // 尾部 padding 为零
        assert!(bytes[2 * ul + 4..].iter().all(|&b| b == 0));
    }
}
