//! 设备命名空间
//!
//! [`DevFs`] 是宿主一侧的 [`Registrar`] 实现：它保存设备号区域、
//! 已绑定的字符设备驱动、设备类以及 `/dev` 下的节点，并负责按路径打开设备。

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use lazy_static::lazy_static;
use log::{debug, warn};
use sync::SpinLock;
use uapi::fcntl::OpenFlags;

use crate::dev::{major, minor};
use crate::devno::ChrdevRegions;
use crate::{CharDevice, File, FsError, Registrar};

/// 设备节点的挂载前缀
pub const DEV_PREFIX: &str = "/dev/";

/// 已绑定的驱动
struct Cdev {
    count: u32,
    driver: Arc<dyn CharDevice>,
}

/// `/dev` 下的一个节点
#[derive(Debug, Clone, PartialEq, Eq)]
struct DevNode {
    class: String,
    devno: u64,
}

#[derive(Default)]
struct DevFsInner {
    regions: ChrdevRegions,
    /// 以区间起始设备号为键
    cdevs: BTreeMap<u64, Cdev>,
    classes: BTreeSet<String>,
    /// 以完整路径为键
    nodes: BTreeMap<String, DevNode>,
}

impl DevFsInner {
    fn find_cdev(&self, maj: u32, min: u32, count: u32) -> Option<&Cdev> {
        self.cdevs
            .iter()
            .find(|(first, cdev)| {
                let first_minor = minor(**first);
                major(**first) == maj
                    && min < first_minor.saturating_add(cdev.count)
                    && first_minor < min.saturating_add(count)
            })
            .map(|(_, cdev)| cdev)
    }

    fn lookup_cdev(&self, dev: u64) -> Option<Arc<dyn CharDevice>> {
        self.find_cdev(major(dev), minor(dev), 1)
            .map(|cdev| cdev.driver.clone())
    }
}

/// 设备命名空间
pub struct DevFs {
    inner: SpinLock<DevFsInner>,
}

lazy_static! {
    /// 系统全局的设备命名空间
    pub static ref DEV_FS: DevFs = DevFs::new();
}

impl DevFs {
    /// 创建空的命名空间
    pub fn new() -> Self {
        Self {
            inner: SpinLock::new(DevFsInner::default()),
        }
    }

    /// 按路径打开设备节点
    pub fn open(&self, path: &str, flags: OpenFlags) -> Result<Arc<dyn File>, FsError> {
        let (devno, driver) = {
            let inner = self.inner.lock();
            let node = inner.nodes.get(path).ok_or(FsError::NotFound)?;
            (node.devno, inner.lookup_cdev(node.devno))
        };
        // 驱动的 open 在锁外调用，驱动可能需要自己的锁
        let driver = driver.ok_or(FsError::NoDevice)?;
        driver.open(devno, flags)
    }

    /// 节点对应的设备号
    pub fn devno_of(&self, path: &str) -> Option<u64> {
        self.inner.lock().nodes.get(path).map(|node| node.devno)
    }

    /// 节点是否存在
    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().nodes.contains_key(path)
    }

    /// 设备号所在区域的名字
    pub fn region_name(&self, dev: u64) -> Option<String> {
        self.inner.lock().regions.name_of(dev).map(String::from)
    }

    /// 设备号是否绑定了驱动
    pub fn has_driver(&self, dev: u64) -> bool {
        self.inner.lock().lookup_cdev(dev).is_some()
    }

    /// 设备类是否存在
    pub fn has_class(&self, name: &str) -> bool {
        self.inner.lock().classes.contains(name)
    }
}

impl Default for DevFs {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar for DevFs {
    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        name: &str,
    ) -> Result<u64, FsError> {
        let dev = self.inner.lock().regions.alloc(first_minor, count, name)?;
        debug!("devfs: allocated {}:{} (+{}) for {}", major(dev), minor(dev), count, name);
        Ok(dev)
    }

    fn register_chrdev_region(&self, first: u64, count: u32, name: &str) -> Result<(), FsError> {
        self.inner.lock().regions.register(first, count, name)
    }

    fn unregister_chrdev_region(&self, first: u64, count: u32) {
        self.inner.lock().regions.unregister(first, count);
    }

    fn cdev_add(
        &self,
        first: u64,
        count: u32,
        driver: Arc<dyn CharDevice>,
    ) -> Result<(), FsError> {
        let (maj, min) = (major(first), minor(first));
        if count == 0 || min.checked_add(count).is_none() {
            return Err(FsError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        if inner.find_cdev(maj, min, count).is_some() {
            return Err(FsError::Busy);
        }
        inner.cdevs.insert(first, Cdev { count, driver });
        Ok(())
    }

    fn cdev_del(&self, first: u64, count: u32) {
        let mut inner = self.inner.lock();
        match inner.cdevs.get(&first) {
            Some(cdev) if cdev.count == count => {
                inner.cdevs.remove(&first);
            }
            _ => warn!("devfs: cdev_del of unbound {}:{}", major(first), minor(first)),
        }
    }

    fn class_create(&self, name: &str) -> Result<(), FsError> {
        if name.is_empty() {
            return Err(FsError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        if !inner.classes.insert(String::from(name)) {
            return Err(FsError::AlreadyExists);
        }
        Ok(())
    }

    fn class_destroy(&self, name: &str) {
        let mut inner = self.inner.lock();
        // 类下残留的节点随类一起消失
        inner.nodes.retain(|_, node| node.class != name);
        inner.classes.remove(name);
    }

    fn device_create(&self, class: &str, devno: u64, name: &str) -> Result<(), FsError> {
        if name.is_empty() || name.contains('/') {
            return Err(FsError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        if !inner.classes.contains(class) {
            return Err(FsError::NotFound);
        }
        let path = format!("{}{}", DEV_PREFIX, name);
        if inner.nodes.contains_key(&path) {
            return Err(FsError::AlreadyExists);
        }
        inner.nodes.insert(
            path,
            DevNode {
                class: String::from(class),
                devno,
            },
        );
        Ok(())
    }

    fn device_destroy(&self, class: &str, devno: u64) {
        self.inner
            .lock()
            .nodes
            .retain(|_, node| !(node.class == class && node.devno == devno));
    }
}
