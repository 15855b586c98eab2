//! 中断保护器
//!
//! 基于 RAII 实现中断保护，在创建时禁用中断，销毁时恢复。
//!
//! 注意：禁用中断只能阻止**本地 CPU** 的“任务 vs 本地中断”并发，
//! 并不能阻止其他 CPU 的并行访问；多核共享数据仍需要配合自旋锁。

use crate::arch_ops;

/// 中断保护器
///
/// 创建时禁用中断并保存之前的状态，销毁时恢复。
/// [`RawSpinLock`](crate::RawSpinLock) 在加锁成功后通过 [`IntrGuard::into_flags`]
/// 把保存的状态转交给锁本身，解锁时再用 [`IntrGuard::restore`] 恢复。
pub struct IntrGuard {
    flags: usize,
}

impl IntrGuard {
    /// 禁用中断并返回一个 IntrGuard 实例。
    pub fn new() -> Self {
        // SAFETY: 保存的 flags 会在 drop 或 restore 时原样恢复
        let flags = unsafe { arch_ops().read_and_disable_interrupts() };
        IntrGuard { flags }
    }

    /// 进入临界区前中断是否处于启用状态
    pub fn was_enabled(&self) -> bool {
        self.flags & arch_ops().interrupt_enable_mask() != 0
    }

    /// 放弃自动恢复，取出保存的中断状态
    pub fn into_flags(self) -> usize {
        let flags = self.flags;
        core::mem::forget(self);
        flags
    }

    /// 恢复由 [`IntrGuard::into_flags`] 取出的中断状态
    ///
    /// # Safety
    /// flags 必须来自同一 CPU 上尚未恢复过的 `into_flags`
    pub unsafe fn restore(flags: usize) {
        unsafe { arch_ops().restore_interrupts(flags) };
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        // SAFETY: flags 是在创建时保存的
        unsafe { arch_ops().restore_interrupts(self.flags) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_arch;

    #[test]
    fn test_guard_disables_and_restores() {
        test_arch::init();
        assert!(test_arch::irq_enabled());
        {
            let guard = IntrGuard::new();
            assert!(guard.was_enabled());
            assert!(!test_arch::irq_enabled());
        }
        assert!(test_arch::irq_enabled());
    }

    #[test]
    fn test_nested_guard_keeps_outer_state() {
        test_arch::init();
        let outer = IntrGuard::new();
        {
            let inner = IntrGuard::new();
            assert!(!inner.was_enabled());
        }
        assert!(!test_arch::irq_enabled());
        drop(outer);
        assert!(test_arch::irq_enabled());
    }

    #[test]
    fn test_into_flags_defers_restore() {
        test_arch::init();
        let flags = IntrGuard::new().into_flags();
        assert!(!test_arch::irq_enabled());
        unsafe { IntrGuard::restore(flags) };
        assert!(test_arch::irq_enabled());
    }
}
