//! open(2) 标志与 lseek(2) 的 whence

use bitflags::bitflags;

bitflags! {
    /// 打开文件时的标志位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0o0;
        const O_WRONLY = 0o1;
        const O_RDWR = 0o2;
        const O_ACCMODE = 0o3;
        const O_NONBLOCK = 0o4000;
        const O_CLOEXEC = 0o2000000;
    }
}

impl OpenFlags {
    /// 访问模式允许读
    pub fn readable(&self) -> bool {
        let mode = self.bits() & Self::O_ACCMODE.bits();
        mode == Self::O_RDONLY.bits() || mode == Self::O_RDWR.bits()
    }

    /// 访问模式允许写
    pub fn writable(&self) -> bool {
        let mode = self.bits() & Self::O_ACCMODE.bits();
        mode == Self::O_WRONLY.bits() || mode == Self::O_RDWR.bits()
    }
}

/// lseek 的定位基准
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// 从文件开头
    Set = 0,
    /// 从当前位置
    Cur = 1,
    /// 从数据末尾
    End = 2,
}

impl TryFrom<usize> for SeekWhence {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeekWhence::Set),
            1 => Ok(SeekWhence::Cur),
            2 => Ok(SeekWhence::End),
            _ => Err(()),
        }
    }
}
