//! simplechar 的宿主文件层
//!
//! 此 crate 模拟内核为字符设备驱动提供的环境，包括：
//!
//! - [`File`] trait - 打开后的会话接口
//! - [`UserReader`] / [`UserWriter`] - 用户空间拷贝原语
//! - [`Registrar`] trait - 设备号、驱动绑定与 `/dev` 节点的注册能力
//! - [`DevFs`] - `Registrar` 的实现，兼按路径打开设备
//! - [`FDTable`] - 文件描述符表

#![no_std]

extern crate alloc;

pub mod dev;
pub mod error;
pub mod ops;

mod devfs;
mod devno;
mod fd_table;
mod file;
mod user;

// Re-export ops
pub use ops::{
    CharDevice, Registrar, UserAccessGuard, VfsOps, register_vfs_ops, vfs_ops,
};

// Re-export error
pub use error::FsError;

// Re-export dev
pub use dev::{major, makedev, minor};

// Re-export file
pub use file::File;

// Re-export user
pub use user::{UserBuffer, UserReader, UserWriter};

// Re-export devno
pub use devno::{ChrdevRegions, MINOR_COUNT, MINORBITS, chrdev_major};

// Re-export devfs
pub use devfs::{DEV_FS, DEV_PREFIX, DevFs};

// Re-export fd_table
pub use fd_table::{DEFAULT_MAX_FDS, FDTable};

// Re-export uapi types for convenience
pub use uapi::fcntl::{OpenFlags, SeekWhence};
