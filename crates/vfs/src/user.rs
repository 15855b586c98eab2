//! 用户空间缓冲区拷贝原语
//!
//! 驱动的 read/write 不直接接触用户指针，而是通过 [`UserReader`] /
//! [`UserWriter`] 顺序搬运数据。每次调用要么完整拷贝，要么返回
//! [`FsError::BadAddress`] 且不移动游标。
//!
//! - `&[u8]` / `&mut [u8]`：内核内部缓冲区，长度不足即视为越界
//! - [`UserBuffer`]：用户地址区间，经 [`VfsOps::access_ok`](crate::VfsOps::access_ok) 校验后访问

use crate::{FsError, UserAccessGuard, vfs_ops};

/// 可读取的调用者缓冲区（write 的数据来源）
pub trait UserReader {
    /// 剩余可读字节数
    fn len(&self) -> usize;

    /// 是否已读完
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读出 `dst.len()` 字节并前移游标
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), FsError>;
}

/// 可写入的调用者缓冲区（read 的数据去向）
pub trait UserWriter {
    /// 剩余可写字节数
    fn len(&self) -> usize;

    /// 是否已写满
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 写入 `src` 的全部字节并前移游标
    fn write_from(&mut self, src: &[u8]) -> Result<(), FsError>;
}

impl<'a> UserReader for &'a [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), FsError> {
        let whole: &'a [u8] = *self;
        if dst.len() > whole.len() {
            return Err(FsError::BadAddress);
        }
        let (head, tail) = whole.split_at(dst.len());
        dst.copy_from_slice(head);
        *self = tail;
        Ok(())
    }
}

impl UserWriter for &mut [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn write_from(&mut self, src: &[u8]) -> Result<(), FsError> {
        if src.len() > <[u8]>::len(self) {
            return Err(FsError::BadAddress);
        }
        let (head, tail) = core::mem::take(self).split_at_mut(src.len());
        head.copy_from_slice(src);
        *self = tail;
        Ok(())
    }
}

/// 用户地址空间中的一段缓冲区
///
/// 只记录地址和长度；每次访问前由宿主校验可访问性，
/// 并在 [`UserAccessGuard`] 的保护下拷贝。
#[derive(Debug, Clone, Copy)]
pub struct UserBuffer {
    addr: usize,
    len: usize,
}

impl UserBuffer {
    /// 描述 `[addr, addr + len)` 的用户缓冲区
    pub fn new(addr: usize, len: usize) -> Self {
        Self { addr, len }
    }

    /// 当前游标处的用户地址
    pub fn addr(&self) -> usize {
        self.addr
    }

    fn checked_range(&self, n: usize) -> Result<usize, FsError> {
        if n > self.len {
            return Err(FsError::BadAddress);
        }
        if n == 0 {
            return Ok(self.addr);
        }
        if self.addr == 0 || !vfs_ops().access_ok(self.addr, n) {
            return Err(FsError::BadAddress);
        }
        Ok(self.addr)
    }

    fn advance(&mut self, n: usize) {
        self.addr += n;
        self.len -= n;
    }
}

impl UserReader for UserBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), FsError> {
        let addr = self.checked_range(dst.len())?;
        if !dst.is_empty() {
            let _guard = UserAccessGuard::new();
            // SAFETY: access_ok 已确认这段用户内存可读
            unsafe {
                core::ptr::copy_nonoverlapping(addr as *const u8, dst.as_mut_ptr(), dst.len());
            }
        }
        self.advance(dst.len());
        Ok(())
    }
}

impl UserWriter for UserBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn write_from(&mut self, src: &[u8]) -> Result<(), FsError> {
        let addr = self.checked_range(src.len())?;
        if !src.is_empty() {
            let _guard = UserAccessGuard::new();
            // SAFETY: access_ok 已确认这段用户内存可写
            unsafe {
                core::ptr::copy_nonoverlapping(src.as_ptr(), addr as *mut u8, src.len());
            }
        }
        self.advance(src.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_reader_advances() {
        let data = [1u8, 2, 3, 4];
        let mut src: &[u8] = &data;
        let mut dst = [0u8; 3];
        src.read_into(&mut dst).unwrap();
        assert_eq!(dst, [1, 2, 3]);
        assert_eq!(UserReader::len(&src), 1);
    }

    #[test]
    fn test_slice_reader_short_is_fault() {
        let data = [1u8, 2];
        let mut src: &[u8] = &data;
        let mut dst = [0u8; 3];
        assert_eq!(src.read_into(&mut dst), Err(FsError::BadAddress));
        assert_eq!(UserReader::len(&src), 2);
        assert_eq!(dst, [0, 0, 0]);
    }

    #[test]
    fn test_slice_writer_advances() {
        let mut out = [0u8; 4];
        let mut dst: &mut [u8] = &mut out;
        dst.write_from(&[9, 8]).unwrap();
        assert_eq!(UserWriter::len(&dst), 2);
        assert_eq!(dst.write_from(&[1, 2, 3]), Err(FsError::BadAddress));
        dst.write_from(&[7]).unwrap();
        assert_eq!(out, [9, 8, 7, 0]);
    }

    #[test]
    fn test_empty_transfer_on_null_user_buffer() {
        // 零长度访问不触碰地址，也不需要宿主校验
        let mut buf = UserBuffer::new(0, 0);
        assert!(UserReader::read_into(&mut buf, &mut []).is_ok());
        assert!(UserWriter::write_from(&mut buf, &[]).is_ok());
    }

    #[test]
    fn test_user_buffer_longer_than_described_is_fault() {
        let mut buf = UserBuffer::new(0x1000, 2);
        let mut dst = [0u8; 4];
        assert_eq!(
            UserReader::read_into(&mut buf, &mut dst),
            Err(FsError::BadAddress)
        );
    }
}
