//! 设备核心
//!
//! 固定容量的缓冲区加上一个只增不减的数据高水位 `size`。
//! 文件位置不属于设备：每个操作都由调用方（会话）传入并取回位置。

use alloc::sync::Arc;
use alloc::vec::Vec;
use log::{debug, error, info};
use sync::RwLock;
use vfs::{File, FsError, OpenFlags, SeekWhence, UserReader, UserWriter, major, minor};

use crate::file::SimpleCharFile;
use crate::status::DevStatus;

/// 受读写锁保护的设备状态
struct DevState {
    /// 长度恒为 capacity，创建时清零
    data: Vec<u8>,
    /// `0 <= size <= capacity`
    size: usize,
    last_write_pos: usize,
    open_count: usize,
}

/// simplechar 设备核心
///
/// 整个设备只有一个实例，由 [`Registration`](crate::Registration) 创建，
/// 并以 `Arc` 的形式共享给每个会话。
pub struct SimpleCharDev {
    capacity: usize,
    state: RwLock<DevState>,
}

impl SimpleCharDev {
    /// 创建容量为 `capacity` 的设备，缓冲区全部清零
    ///
    /// 容量为 0 返回 [`FsError::InvalidArgument`]，分配失败返回 [`FsError::NoMemory`]。
    pub fn new(capacity: usize) -> Result<Arc<Self>, FsError> {
        if capacity == 0 {
            return Err(FsError::InvalidArgument);
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| FsError::NoMemory)?;
        data.resize(capacity, 0);

        Ok(Arc::new(Self {
            capacity,
            state: RwLock::new(DevState {
                data,
                size: 0,
                last_write_pos: 0,
                open_count: 0,
            }),
        }))
    }

    /// 缓冲区容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 打开一个新会话，位置从 0 开始
    pub fn open(self: &Arc<Self>, devno: u64, flags: OpenFlags) -> SimpleCharFile {
        self.state.write().open_count += 1;
        info!(
            "simplechar: Opened device, major={}, minor={}",
            major(devno),
            minor(devno)
        );
        SimpleCharFile::new(self.clone(), devno, flags)
    }

    /// 会话销毁时调用
    pub(crate) fn release(&self, devno: u64) {
        {
            let mut state = self.state.write();
            state.open_count = state.open_count.saturating_sub(1);
        }
        info!(
            "simplechar: Released device, major={}, minor={}",
            major(devno),
            minor(devno)
        );
    }

    /// 从 `*pos` 读出至多 `buf.len()` 字节
    ///
    /// `*pos >= size` 时返回 0。成功后 `*pos` 前移实际读出的字节数；
    /// 拷贝失败时 `*pos` 不变。数据先在读锁内复制到暂存区，
    /// 拷贝到用户缓冲区时不持有设备锁。
    pub fn read(&self, pos: &mut usize, buf: &mut dyn UserWriter) -> Result<usize, FsError> {
        let staged = {
            let state = self.state.read();
            if *pos >= state.size {
                return Ok(0);
            }
            let count = buf.len().min(state.size - *pos);
            let mut staged = Vec::new();
            staged
                .try_reserve_exact(count)
                .map_err(|_| FsError::NoMemory)?;
            staged.extend_from_slice(&state.data[*pos..*pos + count]);
            staged
        };

        if let Err(err) = buf.write_from(&staged) {
            error!("simplechar: Failed to copy data to user");
            return Err(err);
        }

        *pos += staged.len();
        info!("simplechar: Read {} bytes from pos {}", staged.len(), *pos);
        Ok(staged.len())
    }

    /// 把 `buf` 写到 `*pos`，超出容量的部分被截掉
    ///
    /// 返回实际写入的字节数，可能小于请求值。位置已在容量处（或之后）且
    /// 请求需要截断时返回 [`FsError::NoSpace`]。拷贝失败时设备状态与 `*pos` 都不变。
    pub fn write(&self, pos: &mut usize, buf: &mut dyn UserReader) -> Result<usize, FsError> {
        let mut count = buf.len();
        if pos.saturating_add(count) > self.capacity {
            count = self.capacity.saturating_sub(*pos);
            if count == 0 {
                error!("simplechar: Buffer full");
                return Err(FsError::NoSpace);
            }
        }
        if count == 0 {
            return Ok(0);
        }

        // 先把用户数据拷进暂存区，写锁内只做内存拷贝
        let mut staged = Vec::new();
        staged
            .try_reserve_exact(count)
            .map_err(|_| FsError::NoMemory)?;
        staged.resize(count, 0);
        if let Err(err) = buf.read_into(&mut staged) {
            error!("simplechar: Failed to copy data from user");
            return Err(err);
        }

        let end = *pos + count;
        {
            let mut state = self.state.write();
            state.data[*pos..end].copy_from_slice(&staged);
            state.last_write_pos = end;
            if state.size < end {
                state.size = end;
            }
        }

        *pos = end;
        info!("simplechar: Wrote {} bytes to pos {}", count, end);
        Ok(count)
    }

    /// 计算 lseek 之后的新位置
    ///
    /// `End` 以数据高水位 `size` 为基准。结果为负或溢出时返回
    /// [`FsError::InvalidArgument`]；越过 `size` 或容量的位置是合法的。
    pub fn seek(&self, pos: usize, offset: isize, whence: SeekWhence) -> Result<usize, FsError> {
        let base = match whence {
            SeekWhence::Set => 0,
            SeekWhence::Cur => pos,
            SeekWhence::End => self.state.read().size,
        };
        let new_pos = base
            .checked_add_signed(offset)
            .filter(|&p| p <= isize::MAX as usize)
            .ok_or(FsError::InvalidArgument)?;
        debug!(
            "simplechar: Seek {:?} {:+} from {} -> {}",
            whence, offset, pos, new_pos
        );
        Ok(new_pos)
    }

    /// 读取调试信息快照
    pub fn status(&self) -> DevStatus {
        let state = self.state.read();
        DevStatus {
            size: state.size,
            last_write_pos: state.last_write_pos,
            open_count: state.open_count,
        }
    }
}

impl vfs::CharDevice for SimpleCharDev {
    fn open(self: Arc<Self>, devno: u64, flags: OpenFlags) -> Result<Arc<dyn File>, FsError> {
        Ok(Arc::new(SimpleCharDev::open(&self, devno, flags)))
    }
}
