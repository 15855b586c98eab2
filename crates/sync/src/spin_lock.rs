//! 自旋锁封装
//!
//! 提供对数据的互斥访问。
//!
//! # 示例
//! ```ignore
//! let lock = SpinLock::new(0);
//! {
//!     let mut guard = lock.lock(); // 获取锁，关中断
//!     *guard += 1;
//! } // 离开作用域，自动释放锁并恢复中断
//! ```
//!
//! # 注意
//! SpinLock 不可重入，持有锁时应避免长时间运行的操作。

use crate::raw_spin_lock::RawSpinLock;

/// 基于 [`RawSpinLock`] 的互斥自旋锁
pub type SpinLock<T> = lock_api::Mutex<RawSpinLock, T>;

/// [`SpinLock`] 的 RAII 保护器
pub type SpinLockGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinLock, T>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_arch;

    #[test]
    fn test_lock_mutates_data() {
        test_arch::init();
        let lock = SpinLock::new(0usize);
        {
            let mut guard = lock.lock();
            *guard += 1;
        }
        assert_eq!(*lock.lock(), 1);
    }

    #[test]
    fn test_lock_disables_interrupts_while_held() {
        test_arch::init();
        let lock = SpinLock::new(());
        let guard = lock.lock();
        assert!(lock.is_locked());
        assert!(!test_arch::irq_enabled());
        drop(guard);
        assert!(!lock.is_locked());
        assert!(test_arch::irq_enabled());
    }

    #[test]
    fn test_try_lock_fails_when_held_and_restores_interrupts() {
        test_arch::init();
        let lock = SpinLock::new(5u32);
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        // 失败的 try_lock 不改变外层保存的中断状态
        assert!(!test_arch::irq_enabled());
        drop(guard);
        assert!(test_arch::irq_enabled());
        assert_eq!(lock.try_lock().map(|g| *g), Some(5));
    }

    #[test]
    fn test_contended_counter() {
        test_arch::init();
        let lock = std::sync::Arc::new(SpinLock::new(0usize));
        let handles: std::vec::Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                std::thread::spawn(move || {
                    test_arch::init();
                    for _ in 0..1000 {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), 4000);
    }
}
