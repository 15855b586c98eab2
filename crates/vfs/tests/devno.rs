use vfs::{
    ChrdevRegions, FsError, MINOR_COUNT, chrdev_major,
    dev::{major, makedev, minor},
};

#[test]
fn test_makedev_major_minor() {
    let dev = makedev(8, 1);
    assert_eq!(major(dev), 8);
    assert_eq!(minor(dev), 1);
}

#[test]
fn test_makedev_zero() {
    let dev = makedev(0, 0);
    assert_eq!(major(dev), 0);
    assert_eq!(minor(dev), 0);
}

#[test]
fn test_makedev_matches_glibc_encoding() {
    assert_eq!(makedev(254, 0), 0xfe00);
    assert_eq!(makedev(1, 3), 0x0103);
    // 大于 255 的次设备号使用高位字段
    assert_eq!(makedev(0, 0x100), 0x0010_0000);
}

#[test]
fn test_makedev_large_numbers() {
    for (maj, min) in [(511, 0xfffff), (4095, 256), (5000, 1 << 19)] {
        let dev = makedev(maj, min);
        assert_eq!(major(dev), maj);
        assert_eq!(minor(dev), min);
    }
}

#[test]
fn test_dynamic_alloc_starts_at_254_and_descends() {
    let mut regions = ChrdevRegions::new();
    let a = regions.alloc(0, 1, "a").unwrap();
    let b = regions.alloc(0, 1, "b").unwrap();
    assert_eq!(major(a), chrdev_major::DYN_START);
    assert_eq!(major(b), chrdev_major::DYN_START - 1);
    assert_eq!(minor(a), 0);
    assert_eq!(regions.name_of(b), Some("b"));
}

#[test]
fn test_dynamic_alloc_skips_statically_taken_major() {
    let mut regions = ChrdevRegions::new();
    regions.register(makedev(254, 5), 1, "static").unwrap();
    let dev = regions.alloc(0, 1, "dyn").unwrap();
    assert_eq!(major(dev), 253);
}

#[test]
fn test_dynamic_alloc_exhaustion_is_busy() {
    let mut regions = ChrdevRegions::new();
    let span = chrdev_major::DYN_START - chrdev_major::DYN_END + 1;
    for _ in 0..span {
        regions.alloc(0, 1, "x").unwrap();
    }
    assert_eq!(regions.alloc(0, 1, "x"), Err(FsError::Busy));
}

#[test]
fn test_static_register_conflicts() {
    let mut regions = ChrdevRegions::new();
    regions.register(makedev(240, 0), 4, "first").unwrap();
    assert_eq!(
        regions.register(makedev(240, 3), 1, "overlap"),
        Err(FsError::Busy)
    );
    // 同一主设备号下不重叠的区间可以共存
    regions.register(makedev(240, 4), 4, "second").unwrap();
    assert_eq!(regions.len(), 2);
}

#[test]
fn test_register_rejects_bad_ranges() {
    let mut regions = ChrdevRegions::new();
    assert_eq!(
        regions.register(makedev(0, 0), 1, "zero"),
        Err(FsError::InvalidArgument)
    );
    assert_eq!(
        regions.register(makedev(600, 0), 1, "too-big"),
        Err(FsError::InvalidArgument)
    );
    assert_eq!(
        regions.register(makedev(240, 0), 0, "empty"),
        Err(FsError::InvalidArgument)
    );
    assert_eq!(
        regions.alloc(MINOR_COUNT - 1, 2, "overflow"),
        Err(FsError::InvalidArgument)
    );
    assert!(regions.is_empty());
}

#[test]
fn test_unregister_frees_major_for_reuse() {
    let mut regions = ChrdevRegions::new();
    let dev = makedev(240, 0);
    regions.register(dev, 1, "simplechar").unwrap();
    regions.unregister(dev, 1);
    assert!(regions.is_empty());
    regions.register(dev, 1, "simplechar").unwrap();
}

#[test]
fn test_unregister_unknown_region_is_ignored() {
    let mut regions = ChrdevRegions::new();
    regions.register(makedev(240, 0), 2, "keep").unwrap();
    regions.unregister(makedev(240, 0), 1);
    assert_eq!(regions.len(), 1);
}
