//! 同步原语
//!
//! 向 simplechar 设备及其宿主环境提供基本的锁原语：
//!
//! - [`SpinLock`] - 关中断的互斥自旋锁，用于会话偏移量、设备号表等短临界区
//! - [`RwLock`] - 读写自旋锁，用于允许并发读的设备状态
//!
//! 两者都是 [`lock_api`] 之上的类型别名，只需实现底层的 raw lock。
//!
//! # 架构依赖
//!
//! 此 crate 通过 `ArchOps` trait 抽象架构相关操作。
//! 使用 [`SpinLock`] 前必须调用 `register_arch_ops` 注册实现。

#![no_std]

#[cfg(test)]
extern crate std;

mod intr_guard;
mod raw_spin_lock;
mod rwlock;
mod spin_lock;

pub use intr_guard::IntrGuard;
pub use raw_spin_lock::RawSpinLock;
pub use rwlock::{RawRwSpinLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use spin_lock::{SpinLock, SpinLockGuard};

use core::sync::atomic::{AtomicUsize, Ordering};

/// 架构相关操作的 trait
///
/// 由宿主实现并注册，提供中断控制
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);

    /// 中断使能位掩码，用于解释 flags
    fn interrupt_enable_mask(&self) -> usize;
}

/// 全局架构操作实例（存储 fat pointer 的两个部分）
static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_DATA.store(data, Ordering::Release);
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 获取架构操作实例
#[inline]
pub(crate) fn arch_ops() -> &'static dyn ArchOps {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("sync: ArchOps not registered, call register_arch_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) }
}

#[cfg(test)]
pub(crate) mod test_arch {
    //! 单元测试用的架构操作：每个测试线程模拟一个 CPU 的中断开关

    use super::ArchOps;
    use core::cell::Cell;
    use core::sync::atomic::{AtomicUsize, Ordering};

    std::thread_local! {
        static IRQ_ENABLED: Cell<bool> = const { Cell::new(true) };
    }

    const SIE: usize = 0x2;

    struct TestArchOps;

    impl ArchOps for TestArchOps {
        unsafe fn read_and_disable_interrupts(&self) -> usize {
            let was = IRQ_ENABLED.with(|c| c.replace(false));
            if was { SIE } else { 0 }
        }

        unsafe fn restore_interrupts(&self, flags: usize) {
            IRQ_ENABLED.with(|c| c.set(flags & SIE != 0));
        }

        fn interrupt_enable_mask(&self) -> usize {
            SIE
        }
    }

    static TEST_ARCH_OPS: TestArchOps = TestArchOps;
    // 0 = uninit, 1 = initializing, 2 = ready
    static INIT: AtomicUsize = AtomicUsize::new(0);

    pub fn init() {
        match INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {
                unsafe { super::register_arch_ops(&TEST_ARCH_OPS) };
                INIT.store(2, Ordering::Release);
            }
            Err(_) => {
                while INIT.load(Ordering::Acquire) != 2 {
                    core::hint::spin_loop();
                }
            }
        }
    }

    pub fn irq_enabled() -> bool {
        IRQ_ENABLED.with(|c| c.get())
    }
}
