//! 集成测试共用的宿主注册

use std::sync::atomic::{AtomicUsize, Ordering};

use sync::ArchOps;
use vfs::VfsOps;

struct DummyArchOps;

impl ArchOps for DummyArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        0
    }

    unsafe fn restore_interrupts(&self, _flags: usize) {}

    fn interrupt_enable_mask(&self) -> usize {
        0
    }
}

struct DummyVfsOps;

impl VfsOps for DummyVfsOps {
    fn enter_user_access(&self) {}

    fn exit_user_access(&self) {}

    fn access_ok(&self, addr: usize, _len: usize) -> bool {
        addr != 0
    }
}

static DUMMY_ARCH_OPS: DummyArchOps = DummyArchOps;
static DUMMY_VFS_OPS: DummyVfsOps = DummyVfsOps;
// 0 = uninit, 1 = initializing, 2 = ready
static INIT: AtomicUsize = AtomicUsize::new(0);

pub fn init() {
    match INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            // Safety: tests use a single global dummy implementation.
            unsafe {
                sync::register_arch_ops(&DUMMY_ARCH_OPS);
                vfs::register_vfs_ops(&DUMMY_VFS_OPS);
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
