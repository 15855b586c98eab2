//! 文件抽象层 - 会话层接口
//!
//! 该模块定义了统一的文件操作接口 [`File`] trait。
//! 每次 open 产生一个实现 `File` 的会话对象，以 `Arc<dyn File>` 形式存放在
//! 文件描述符表中；最后一个引用被释放时即为 release。
//!
//! `File` 通常是“有状态”的（例如维护当前 offset），适合实现 `read/write/lseek` 语义。

use uapi::fcntl::{OpenFlags, SeekWhence};

use crate::{FsError, UserReader, UserWriter};

/// 文件操作的统一接口
pub trait File: Send + Sync {
    /// 检查文件是否可读
    fn readable(&self) -> bool;

    /// 检查文件是否可写
    fn writable(&self) -> bool;

    /// 从当前偏移量读取数据到 `buf`，并前移偏移量
    fn read(&self, buf: &mut dyn UserWriter) -> Result<usize, FsError>;

    /// 把 `buf` 中的数据写到当前偏移量，并前移偏移量
    fn write(&self, buf: &mut dyn UserReader) -> Result<usize, FsError>;

    /// 设置文件偏移量（可选方法）
    fn lseek(&self, _offset: isize, _whence: SeekWhence) -> Result<usize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 获取当前偏移量（可选方法）
    fn offset(&self) -> usize {
        0
    }

    /// 获取打开标志（可选方法）
    fn flags(&self) -> OpenFlags {
        OpenFlags::empty()
    }

    /// 从指定位置读取数据，不改变偏移量（可选方法，用于 pread64）
    fn read_at(&self, _offset: usize, _buf: &mut dyn UserWriter) -> Result<usize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 向指定位置写入数据，不改变偏移量（可选方法，用于 pwrite64）
    fn write_at(&self, _offset: usize, _buf: &mut dyn UserReader) -> Result<usize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 执行设备特定的控制操作（可选方法，用于 ioctl）
    fn ioctl(&self, _request: u32, _arg: usize) -> Result<isize, FsError> {
        Err(FsError::NotTty)
    }

    /// 获取 Any trait 引用，用于安全的类型转换
    fn as_any(&self) -> &dyn core::any::Any;
}
