//! 字符设备号区域管理
//!
//! 记录哪些 `(major, minor)` 区间已被驱动占用，支持静态注册与动态分配。
//! 动态分配的规则与 Linux 相同：从 254 向下查找第一个完全空闲的主设备号，
//! 直到 234 为止。

use alloc::string::String;
use alloc::vec::Vec;
use log::warn;

use crate::FsError;
use crate::dev::{major, makedev, minor};

/// 标准字符设备 major 号
pub mod chrdev_major {
    /// /dev/null, /dev/zero 等
    pub const MEM: u32 = 1;
    /// /dev/misc/*
    pub const MISC: u32 = 10;
    /// 动态分配区间的起点（含，向下搜索）
    pub const DYN_START: u32 = 254;
    /// 动态分配区间的终点（含）
    pub const DYN_END: u32 = 234;
    /// 主设备号上限（不含）
    pub const MAX: u32 = 512;
}

/// 次设备号位数
pub const MINORBITS: u32 = 20;

/// 单个主设备号下的次设备号个数
pub const MINOR_COUNT: u32 = 1 << MINORBITS;

/// 一个已占用的设备号区间
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChrdevRegion {
    major: u32,
    first_minor: u32,
    count: u32,
    name: String,
}

impl ChrdevRegion {
    fn overlaps(&self, major: u32, first_minor: u32, count: u32) -> bool {
        self.major == major
            && first_minor < self.first_minor.saturating_add(self.count)
            && self.first_minor < first_minor.saturating_add(count)
    }
}

/// 设备号区域表
#[derive(Debug, Default)]
pub struct ChrdevRegions {
    regions: Vec<ChrdevRegion>,
}

impl ChrdevRegions {
    /// 创建空表
    pub const fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    fn check_range(first_minor: u32, count: u32) -> Result<(), FsError> {
        if count == 0 || first_minor.checked_add(count).is_none_or(|end| end > MINOR_COUNT) {
            return Err(FsError::InvalidArgument);
        }
        Ok(())
    }

    fn is_free(&self, major: u32, first_minor: u32, count: u32) -> bool {
        !self
            .regions
            .iter()
            .any(|r| r.overlaps(major, first_minor, count))
    }

    /// 动态分配主设备号，返回区间起始设备号
    pub fn alloc(&mut self, first_minor: u32, count: u32, name: &str) -> Result<u64, FsError> {
        Self::check_range(first_minor, count)?;
        let major = (chrdev_major::DYN_END..=chrdev_major::DYN_START)
            .rev()
            .find(|&maj| self.regions.iter().all(|r| r.major != maj))
            .ok_or(FsError::Busy)?;
        self.insert(major, first_minor, count, name)?;
        Ok(makedev(major, first_minor))
    }

    /// 占用以 `first` 开始的 `count` 个设备号
    pub fn register(&mut self, first: u64, count: u32, name: &str) -> Result<(), FsError> {
        let (maj, min) = (major(first), minor(first));
        if maj == 0 || maj >= chrdev_major::MAX {
            return Err(FsError::InvalidArgument);
        }
        Self::check_range(min, count)?;
        if !self.is_free(maj, min, count) {
            return Err(FsError::Busy);
        }
        self.insert(maj, min, count, name)
    }

    fn insert(&mut self, major: u32, first_minor: u32, count: u32, name: &str) -> Result<(), FsError> {
        self.regions
            .try_reserve(1)
            .map_err(|_| FsError::NoMemory)?;
        self.regions.push(ChrdevRegion {
            major,
            first_minor,
            count,
            name: String::from(name),
        });
        Ok(())
    }

    /// 释放与 `(first, count)` 完全一致的区间
    pub fn unregister(&mut self, first: u64, count: u32) {
        let (maj, min) = (major(first), minor(first));
        match self
            .regions
            .iter()
            .position(|r| r.major == maj && r.first_minor == min && r.count == count)
        {
            Some(idx) => {
                self.regions.swap_remove(idx);
            }
            None => warn!(
                "chrdev: unregister of unknown region {}:{} (+{})",
                maj, min, count
            ),
        }
    }

    /// 查询设备号所属区间的名字
    pub fn name_of(&self, dev: u64) -> Option<&str> {
        let (maj, min) = (major(dev), minor(dev));
        self.regions
            .iter()
            .find(|r| r.overlaps(maj, min, 1))
            .map(|r| r.name.as_str())
    }

    /// 已占用区间数
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// 是否没有任何占用
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
