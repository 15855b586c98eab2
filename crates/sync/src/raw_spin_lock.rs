//! 自旋锁实现
//!
//! 基于原子操作实现 [`lock_api::RawMutex`]，加锁期间本地中断保持关闭。

use crate::intr_guard::IntrGuard;
use core::{
    hint,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};
use lock_api::{GuardNoSend, RawMutex};

/// 关中断的原始自旋锁
///
/// 加锁时先关闭本地中断再自旋，成功后把之前的中断状态记在锁里，
/// 解锁时释放锁标志并恢复中断。不可重入。
#[derive(Debug)]
pub struct RawSpinLock {
    locked: AtomicBool,
    saved_flags: AtomicUsize,
}

impl RawSpinLock {
    /// 创建一个未加锁的 RawSpinLock
    pub const fn new() -> Self {
        RawSpinLock {
            locked: AtomicBool::new(false),
            saved_flags: AtomicUsize::new(0),
        }
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: locked 的 Acquire/Release 保证了同一时刻只有一个持有者
unsafe impl RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    // 中断状态属于加锁的 CPU，guard 不能跨线程移动
    type GuardMarker = GuardNoSend;

    fn lock(&self) {
        let guard = IntrGuard::new();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            hint::spin_loop();
        }
        self.saved_flags.store(guard.into_flags(), Ordering::Relaxed);
    }

    fn try_lock(&self) -> bool {
        let guard = IntrGuard::new();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.saved_flags.store(guard.into_flags(), Ordering::Relaxed);
            true
        } else {
            // guard 在此 drop，立即恢复中断
            false
        }
    }

    unsafe fn unlock(&self) {
        let flags = self.saved_flags.load(Ordering::Relaxed);
        self.locked.store(false, Ordering::Release);
        // SAFETY: flags 由持有者在 lock/try_lock 中保存
        unsafe { IntrGuard::restore(flags) };
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}
