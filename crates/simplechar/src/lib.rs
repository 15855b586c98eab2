//! simplechar 字符设备
//!
//! 一个只有单个固定容量缓冲区的字符设备：
//!
//! - [`SimpleCharDev`] - 设备核心，持有缓冲区、数据高水位与设备级计数
//! - [`SimpleCharFile`] - 每次 open 得到的会话，持有私有的文件位置
//! - [`DevStatus`] - 调试信息快照，经 `SIMPLECHAR_IOC_GETDEBUG` 传给用户
//! - [`SimplecharConfig`] - 模块参数
//! - [`Registration`] - 模块加载/卸载，向宿主申请并归还资源
//!
//! # 并发
//!
//! 设备状态位于一把读写锁之后：open/release/write 持写锁，
//! read 与状态查询持读锁。会话的文件位置由会话自己的自旋锁保护，
//! 锁顺序固定为“会话位置 → 设备状态”。

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod config;
mod device;
mod file;
mod registration;
mod status;

pub use config::{DEFAULT_CAPACITY, SimplecharConfig};
pub use device::SimpleCharDev;
pub use file::SimpleCharFile;
pub use registration::Registration;
pub use status::DevStatus;

pub use uapi::simplechar::{
    SIMPLECHAR_IOC_GETDEBUG, SIMPLECHAR_IOC_MAGIC, SIMPLECHAR_NAME, SimplecharDebugInfo,
};
