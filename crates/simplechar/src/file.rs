//! 会话：一次 open 对应一个 [`SimpleCharFile`]

use alloc::sync::Arc;
use core::any::Any;
use core::mem::size_of;
use log::{debug, error};
use sync::SpinLock;
use uapi::simplechar::{SIMPLECHAR_IOC_GETDEBUG, SimplecharDebugInfo};
use vfs::{File, FsError, OpenFlags, SeekWhence, UserBuffer, UserReader, UserWriter};

use crate::device::SimpleCharDev;

/// simplechar 设备上的一个打开会话
///
/// 持有私有的文件位置，同一会话上的操作由位置锁串行化。
/// 位置锁关中断，并在整个 read/write 期间持有，其中包括与用户缓冲区之间的拷贝；
/// 单次拷贝的长度不超过设备容量。设备锁则只覆盖缓冲区内的内存拷贝。
/// 会话被销毁时调用设备的 release。
pub struct SimpleCharFile {
    dev: Arc<SimpleCharDev>,
    devno: u64,
    flags: OpenFlags,
    offset: SpinLock<usize>,
}

impl SimpleCharFile {
    pub(crate) fn new(dev: Arc<SimpleCharDev>, devno: u64, flags: OpenFlags) -> Self {
        Self {
            dev,
            devno,
            flags,
            offset: SpinLock::new(0),
        }
    }

    /// 会话所属的设备
    pub fn device(&self) -> &Arc<SimpleCharDev> {
        &self.dev
    }

    /// 打开时使用的设备号
    pub fn devno(&self) -> u64 {
        self.devno
    }

    /// 显式关闭会话
    pub fn release(self) {
        drop(self);
    }

    fn check_readable(&self) -> Result<(), FsError> {
        if self.flags.readable() {
            Ok(())
        } else {
            Err(FsError::BadFileDescriptor)
        }
    }

    fn check_writable(&self) -> Result<(), FsError> {
        if self.flags.writable() {
            Ok(())
        } else {
            Err(FsError::BadFileDescriptor)
        }
    }

    fn get_debug(&self, arg: usize) -> Result<isize, FsError> {
        let info = SimplecharDebugInfo::from(self.dev.status());
        let mut out = UserBuffer::new(arg, size_of::<SimplecharDebugInfo>());
        if let Err(err) = out.write_from(info.as_bytes()) {
            error!("simplechar: Failed to copy debug info to user");
            return Err(err);
        }
        debug!(
            "simplechar: Debug info sent: size={}, last_write_pos={}, open_count={}",
            info.size, info.last_write_pos, info.open_count
        );
        Ok(0)
    }
}

impl File for SimpleCharFile {
    fn readable(&self) -> bool {
        self.flags.readable()
    }

    fn writable(&self) -> bool {
        self.flags.writable()
    }

    fn read(&self, buf: &mut dyn UserWriter) -> Result<usize, FsError> {
        self.check_readable()?;
        let mut offset = self.offset.lock();
        self.dev.read(&mut offset, buf)
    }

    fn write(&self, buf: &mut dyn UserReader) -> Result<usize, FsError> {
        self.check_writable()?;
        let mut offset = self.offset.lock();
        self.dev.write(&mut offset, buf)
    }

    fn lseek(&self, offset: isize, whence: SeekWhence) -> Result<usize, FsError> {
        let mut pos = self.offset.lock();
        *pos = self.dev.seek(*pos, offset, whence)?;
        Ok(*pos)
    }

    fn offset(&self) -> usize {
        *self.offset.lock()
    }

    fn flags(&self) -> OpenFlags {
        self.flags
    }

    fn read_at(&self, offset: usize, buf: &mut dyn UserWriter) -> Result<usize, FsError> {
        self.check_readable()?;
        let mut pos = offset;
        self.dev.read(&mut pos, buf)
    }

    fn write_at(&self, offset: usize, buf: &mut dyn UserReader) -> Result<usize, FsError> {
        self.check_writable()?;
        let mut pos = offset;
        self.dev.write(&mut pos, buf)
    }

    fn ioctl(&self, request: u32, arg: usize) -> Result<isize, FsError> {
        match request {
            SIMPLECHAR_IOC_GETDEBUG => self.get_debug(arg),
            _ => Err(FsError::NotTty),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SimpleCharFile {
    fn drop(&mut self) {
        self.dev.release(self.devno);
    }
}
