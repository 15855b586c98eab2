//! ioctl 请求号编码
//!
//! 与 Linux `include/uapi/asm-generic/ioctl.h` 的布局一致：
//! `dir << 30 | size << 16 | type << 8 | nr`。

pub const IOC_NRBITS: u32 = 8;
pub const IOC_TYPEBITS: u32 = 8;
pub const IOC_SIZEBITS: u32 = 14;
pub const IOC_DIRBITS: u32 = 2;

pub const IOC_NRSHIFT: u32 = 0;
pub const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
pub const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
pub const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

pub const IOC_NONE: u32 = 0;
pub const IOC_WRITE: u32 = 1;
pub const IOC_READ: u32 = 2;

const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// `_IOC(dir, type, nr, size)`
pub const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((size as u32 & mask(IOC_SIZEBITS)) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// `_IO(type, nr)`
pub const fn io(ty: u8, nr: u8) -> u32 {
    ioc(IOC_NONE, ty, nr, 0)
}

/// `_IOR(type, nr, T)`：设备向调用者传出 `size` 字节
pub const fn ior(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(IOC_READ, ty, nr, size)
}

/// `_IOW(type, nr, T)`：调用者向设备传入 `size` 字节
pub const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(IOC_WRITE, ty, nr, size)
}

pub const fn ioc_dir(request: u32) -> u32 {
    (request >> IOC_DIRSHIFT) & mask(IOC_DIRBITS)
}

pub const fn ioc_type(request: u32) -> u8 {
    ((request >> IOC_TYPESHIFT) & mask(IOC_TYPEBITS)) as u8
}

pub const fn ioc_nr(request: u32) -> u8 {
    ((request >> IOC_NRSHIFT) & mask(IOC_NRBITS)) as u8
}

pub const fn ioc_size(request: u32) -> usize {
    ((request >> IOC_SIZESHIFT) & mask(IOC_SIZEBITS)) as usize
}
