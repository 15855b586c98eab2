//! 模块加载与卸载
//!
//! 加载顺序：设备号 → 设备核心 → 驱动绑定 → 设备类 → `/dev` 节点。
//! 任一步失败都按相反顺序撤销已完成的步骤；卸载时同样逆序撤销。

use alloc::sync::Arc;
use log::{error, info};
use uapi::simplechar::SIMPLECHAR_NAME;
use vfs::{FsError, Registrar, major, makedev};

use crate::config::SimplecharConfig;
use crate::device::SimpleCharDev;

/// 已完成的加载步骤，按完成顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Region,
    Core,
    Cdev,
    Class,
    Node,
}

/// 从 `reached` 开始逆序撤销
fn teardown(
    registrar: &dyn Registrar,
    devno: u64,
    reached: Stage,
    dev: Option<Arc<SimpleCharDev>>,
) {
    if reached >= Stage::Node {
        registrar.device_destroy(SIMPLECHAR_NAME, devno);
    }
    if reached >= Stage::Class {
        registrar.class_destroy(SIMPLECHAR_NAME);
    }
    if reached >= Stage::Cdev {
        registrar.cdev_del(devno, 1);
    }
    // 还有会话持有设备时，缓冲区在最后一个会话关闭后才释放
    drop(dev);
    registrar.unregister_chrdev_region(devno, 1);
}

/// 一次成功的模块加载
///
/// 存活期间设备可以通过 `/dev/simplechar` 打开；被 drop 时卸载模块。
pub struct Registration<'a> {
    registrar: &'a dyn Registrar,
    devno: u64,
    /// 只在 drop 过程中被取走
    dev: Option<Arc<SimpleCharDev>>,
}

impl<'a> Registration<'a> {
    /// 加载模块
    ///
    /// `config.major` 非零时静态占用 `(major, 0)`，否则动态分配。
    pub fn new(config: SimplecharConfig, registrar: &'a dyn Registrar) -> Result<Self, FsError> {
        info!("simplechar: Initializing module");
        config.validate()?;

        let devno = if config.major != 0 {
            let devno = makedev(config.major, 0);
            registrar
                .register_chrdev_region(devno, 1, SIMPLECHAR_NAME)
                .map(|_| devno)
        } else {
            registrar.alloc_chrdev_region(0, 1, SIMPLECHAR_NAME)
        }
        .inspect_err(|_| error!("simplechar: Failed to allocate device number"))?;

        let dev = match SimpleCharDev::new(config.capacity) {
            Ok(dev) => dev,
            Err(err) => {
                error!("simplechar: Failed to allocate buffer");
                teardown(registrar, devno, Stage::Region, None);
                return Err(err);
            }
        };

        if let Err(err) = registrar.cdev_add(devno, 1, dev.clone()) {
            error!("simplechar: Failed to add cdev");
            teardown(registrar, devno, Stage::Core, Some(dev));
            return Err(err);
        }

        if let Err(err) = registrar.class_create(SIMPLECHAR_NAME) {
            error!("simplechar: Failed to create class");
            teardown(registrar, devno, Stage::Cdev, Some(dev));
            return Err(err);
        }

        if let Err(err) = registrar.device_create(SIMPLECHAR_NAME, devno, SIMPLECHAR_NAME) {
            error!("simplechar: Failed to create device");
            teardown(registrar, devno, Stage::Class, Some(dev));
            return Err(err);
        }

        info!("simplechar: Module loaded, major={}", major(devno));
        Ok(Self {
            registrar,
            devno,
            dev: Some(dev),
        })
    }

    /// 设备号 `(major, 0)`
    pub fn devno(&self) -> u64 {
        self.devno
    }

    /// 实际使用的主设备号
    pub fn major(&self) -> u32 {
        major(self.devno)
    }

    /// 设备核心
    pub fn device(&self) -> &Arc<SimpleCharDev> {
        match &self.dev {
            Some(dev) => dev,
            None => unreachable!("simplechar: device taken before unload"),
        }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let dev = self.dev.take();
        teardown(self.registrar, self.devno, Stage::Node, dev);
        info!("simplechar: Module unloaded");
    }
}
