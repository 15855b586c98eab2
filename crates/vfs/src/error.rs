//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的错误码，可通过 [`FsError::to_errno()`] 转换为系统调用错误码。

use uapi::errno::*;

/// VFS 错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 查找相关
    /// 文件不存在 (-ENOENT)
    NotFound,
    /// 已存在 (-EEXIST)
    AlreadyExists,
    /// 设备不存在 (-ENODEV)
    NoDevice,

    // 文件描述符相关
    /// 无效的文件描述符，或访问模式不允许该操作 (-EBADF)
    BadFileDescriptor,
    /// 打开的文件过多 (-EMFILE)
    TooManyOpenFiles,

    // 参数相关
    /// 无效参数，包括会产生负偏移的 lseek (-EINVAL)
    InvalidArgument,
    /// 用户空间地址不可访问 (-EFAULT)
    BadAddress,

    // 资源相关
    /// 设备空间不足 (-ENOSPC)
    NoSpace,
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 资源被占用，例如设备号区域冲突 (-EBUSY)
    Busy,

    // 其他
    /// 设备不认识该 ioctl 请求 (-ENOTTY)
    NotTty,
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
}

impl FsError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        let errno = match self {
            FsError::NotFound => ENOENT,
            FsError::AlreadyExists => EEXIST,
            FsError::NoDevice => ENODEV,
            FsError::BadFileDescriptor => EBADF,
            FsError::TooManyOpenFiles => EMFILE,
            FsError::InvalidArgument => EINVAL,
            FsError::BadAddress => EFAULT,
            FsError::NoSpace => ENOSPC,
            FsError::NoMemory => ENOMEM,
            FsError::Busy => EBUSY,
            FsError::NotTty => ENOTTY,
            FsError::NotSupported => ENOTSUP,
        };
        -(errno as isize)
    }
}
