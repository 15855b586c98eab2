//! 文件描述符表
//!
//! 约定与语义：
//!
//! - `alloc()` 分配“最小可用 fd”
//! - `dup()` 共享底层 `Arc<dyn File>`，因此也共享 offset
//! - `close()` 只释放表中的引用；最后一个引用消失时文件才被 release

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use sync::SpinLock;

use crate::{File, FsError};

/// 默认最大文件描述符数
pub const DEFAULT_MAX_FDS: usize = 256;

/// 文件描述符表
pub struct FDTable {
    /// 文件描述符数组
    files: SpinLock<Vec<Option<Arc<dyn File>>>>,
    /// 最大文件描述符数量
    max_fds: usize,
}

impl fmt::Debug for FDTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = self.files.lock();
        let used = files.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("FDTable")
            .field("max_fds", &self.max_fds)
            .field("slots", &files.len())
            .field("used", &used)
            .finish()
    }
}

impl FDTable {
    /// 创建最多容纳 `max_fds` 个描述符的表
    pub fn new(max_fds: usize) -> Self {
        Self {
            files: SpinLock::new(Vec::new()),
            max_fds,
        }
    }

    /// 分配一个新的文件描述符
    pub fn alloc(&self, file: Arc<dyn File>) -> Result<usize, FsError> {
        let mut files = self.files.lock();

        // 查找最小可用 FD
        if let Some((fd, slot)) = files.iter_mut().enumerate().find(|(_, s)| s.is_none()) {
            *slot = Some(file);
            return Ok(fd);
        }

        // 如果没有空闲槽位，扩展数组
        let fd = files.len();
        if fd >= self.max_fds {
            return Err(FsError::TooManyOpenFiles);
        }
        files.try_reserve(1).map_err(|_| FsError::NoMemory)?;
        files.push(Some(file));
        Ok(fd)
    }

    /// 获取文件对象
    pub fn get(&self, fd: usize) -> Result<Arc<dyn File>, FsError> {
        let files = self.files.lock();
        files
            .get(fd)
            .and_then(|f| f.clone())
            .ok_or(FsError::BadFileDescriptor)
    }

    /// 关闭文件描述符
    pub fn close(&self, fd: usize) -> Result<(), FsError> {
        // 文件在锁外 drop，release 回调可能需要获取别的锁
        let file = {
            let mut files = self.files.lock();
            files
                .get_mut(fd)
                .and_then(Option::take)
                .ok_or(FsError::BadFileDescriptor)?
        };
        drop(file);
        Ok(())
    }

    /// 复制文件描述符
    pub fn dup(&self, old_fd: usize) -> Result<usize, FsError> {
        let file = self.get(old_fd)?;
        self.alloc(file)
    }

    /// 关闭全部文件描述符
    pub fn close_all(&self) {
        let files = core::mem::take(&mut *self.files.lock());
        drop(files);
    }

    /// 正在使用的描述符个数
    pub fn used(&self) -> usize {
        self.files.lock().iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for FDTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FDS)
    }
}
