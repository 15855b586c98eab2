//! 与用户空间共用定义和声明
//!
//! 包含常量、类型和结构体布局，确保设备和用户程序的一致性

#![no_std]
#![allow(dead_code)]
// uapi 中包含大量与 Linux 兼容的常量定义；逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod errno;
pub mod fcntl;
pub mod ioctl;
pub mod simplechar;
