//! simplechar 集成测试共用的宿主环境
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use simplechar::{Registration, SimplecharConfig};
use sync::ArchOps;
use vfs::{DevFs, VfsOps};

struct NoIrqArchOps;

impl ArchOps for NoIrqArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        0
    }

    unsafe fn restore_interrupts(&self, _flags: usize) {}

    fn interrupt_enable_mask(&self) -> usize {
        0
    }
}

/// 除空指针外都当作可访问的用户地址
struct FlatVfsOps;

impl VfsOps for FlatVfsOps {
    fn enter_user_access(&self) {}

    fn exit_user_access(&self) {}

    fn access_ok(&self, addr: usize, _len: usize) -> bool {
        addr != 0
    }
}

static ARCH_OPS: NoIrqArchOps = NoIrqArchOps;
static VFS_OPS: FlatVfsOps = FlatVfsOps;
// 0 = uninit, 1 = initializing, 2 = ready
static INIT: AtomicUsize = AtomicUsize::new(0);

pub fn init() {
    match INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            unsafe {
                sync::register_arch_ops(&ARCH_OPS);
                vfs::register_vfs_ops(&VFS_OPS);
            }
            INIT.store(2, Ordering::Release);
        }
        Err(_) => {
            while INIT.load(Ordering::Acquire) != 2 {
                std::hint::spin_loop();
            }
        }
    }
}

/// 以给定容量、动态主设备号加载到 `devfs`
pub fn load(devfs: &DevFs, capacity: usize) -> Registration<'_> {
    init();
    let config = SimplecharConfig {
        major: 0,
        capacity,
    };
    Registration::new(config, devfs).unwrap()
}
