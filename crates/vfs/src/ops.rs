//! 宿主运行时操作 trait 定义和注册
//!
//! 此模块定义了 VFS 层需要的外部依赖接口，以及设备驱动在加载/卸载时
//! 向宿主申请资源所用的 [`Registrar`] 能力。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};
use uapi::fcntl::OpenFlags;

use crate::{File, FsError};

/// VFS 运行时操作
///
/// 宿主需要实现此 trait 并在启动时注册。
pub trait VfsOps: Send + Sync {
    /// 进入用户空间访问模式
    fn enter_user_access(&self);

    /// 退出用户空间访问模式
    fn exit_user_access(&self);

    /// 检查 `[addr, addr + len)` 是否是当前任务可访问的用户地址
    ///
    /// 返回 true 时，调用方会直接通过指针读写这段内存。
    fn access_ok(&self, addr: usize, len: usize) -> bool;
}

/// 字符设备驱动接口
///
/// 相当于字符设备的 `file_operations`：`open` 产生一个会话，
/// 其余操作由返回的 [`File`] 提供，会话销毁即 release。
pub trait CharDevice: Send + Sync {
    /// 打开设备，返回新的会话
    fn open(self: Arc<Self>, devno: u64, flags: OpenFlags) -> Result<Arc<dyn File>, FsError>;
}

/// 设备注册能力
///
/// 设备号分配、驱动绑定、设备类与 `/dev` 节点的创建都由宿主完成。
/// 驱动只在加载和卸载时使用它。
pub trait Registrar: Send + Sync {
    /// 动态分配一个主设备号，占用 `[first_minor, first_minor + count)`
    fn alloc_chrdev_region(&self, first_minor: u32, count: u32, name: &str)
    -> Result<u64, FsError>;

    /// 占用指定的设备号区域
    fn register_chrdev_region(&self, first: u64, count: u32, name: &str) -> Result<(), FsError>;

    /// 释放设备号区域
    fn unregister_chrdev_region(&self, first: u64, count: u32);

    /// 把驱动绑定到设备号区域
    fn cdev_add(&self, first: u64, count: u32, driver: Arc<dyn CharDevice>)
    -> Result<(), FsError>;

    /// 解除绑定
    fn cdev_del(&self, first: u64, count: u32);

    /// 创建设备类
    fn class_create(&self, name: &str) -> Result<(), FsError>;

    /// 销毁设备类
    fn class_destroy(&self, name: &str);

    /// 在设备类下创建 `/dev/<name>` 节点
    fn device_create(&self, class: &str, devno: u64, name: &str) -> Result<(), FsError>;

    /// 删除设备类下对应设备号的节点
    fn device_destroy(&self, class: &str, devno: u64);
}

// ========== VfsOps 注册 ==========

static VFS_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static VFS_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册 VFS 操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_vfs_ops(ops: &'static dyn VfsOps) {
    let ptr = ops as *const dyn VfsOps;
    // SAFETY: 将 fat pointer 拆分为 data 和 vtable 两部分存储
    let (data, vtable) =
        unsafe { core::mem::transmute::<*const dyn VfsOps, (usize, usize)>(ptr) };
    VFS_OPS_DATA.store(data, Ordering::Release);
    VFS_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 获取已注册的 VFS 操作实现
///
/// # Panics
/// 如果尚未调用 [`register_vfs_ops`] 注册实现，则 panic
#[inline]
pub fn vfs_ops() -> &'static dyn VfsOps {
    let data = VFS_OPS_DATA.load(Ordering::Acquire);
    let vtable = VFS_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("vfs: VfsOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn VfsOps>((data, vtable)) }
}

/// 用户空间访问保护 guard
///
/// 在作用域结束时自动退出用户空间访问模式
pub struct UserAccessGuard;

impl UserAccessGuard {
    /// 创建新的用户空间访问保护
    #[inline]
    pub fn new() -> Self {
        vfs_ops().enter_user_access();
        Self
    }
}

impl Drop for UserAccessGuard {
    #[inline]
    fn drop(&mut self) {
        vfs_ops().exit_user_access();
    }
}

impl Default for UserAccessGuard {
    fn default() -> Self {
        Self::new()
    }
}
