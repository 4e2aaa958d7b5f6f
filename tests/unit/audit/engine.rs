use super::*;
use crate::segment::chroma::{ChromaKey, segment};

fn opts(dir: &tempfile::TempDir) -> AuditOptions {
    AuditOptions {
        source_root: dir.path().join("blue"),
        transparent_root: dir.path().join("transparent"),
    }
}

#[test]
fn classifies_each_source_against_its_cutout() {
    let dir = tempfile::tempdir().unwrap();
    let o = opts(&dir);

    let all_blue = Raster::filled(2, 2, [0, 0, 200, 255]);
    all_blue.save_png(&o.source_root.join("sky-blue.png")).unwrap();
    segment(&all_blue, &ChromaKey::default())
        .save_png(&o.transparent_root.join("sky.png"))
        .unwrap();

    let mut mixed = Raster::filled(10, 10, [200, 0, 0, 255]);
    for y in 0..10 {
        for x in 0..5 {
            mixed.set_pixel(x, y, [0, 0, 200, 255]);
        }
    }
    mixed.save_png(&o.source_root.join("sub/blue-gem.png")).unwrap();
    segment(&mixed, &ChromaKey::default())
        .save_png(&o.transparent_root.join("sub/gem.png"))
        .unwrap();

    Raster::filled(2, 2, [0, 0, 0, 255])
        .save_png(&o.source_root.join("orphan.png"))
        .unwrap();
    std::fs::write(o.source_root.join("broken.png"), b"junk").unwrap();
    std::fs::write(o.transparent_root.join("broken.png"), b"junk").unwrap();

    let records = AuditEngine::new(o.clone()).run().unwrap();
    let by_name = |n: &str| records.iter().find(|r| r.name == n).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(by_name("sky.png").status, AuditStatus::Empty);
    let gem = by_name("gem.png");
    assert_eq!(gem.status, AuditStatus::Good);
    assert_eq!(gem.stats.unwrap().removed_ratio, 0.5);
    assert_eq!(gem.output, o.transparent_root.join("sub/gem.png"));
    assert_eq!(by_name("orphan.png").status, AuditStatus::MissingOutput);
    let broken = by_name("broken.png");
    assert_eq!(broken.status, AuditStatus::Error);
    assert!(broken.error.is_some());
}

#[test]
fn audit_does_not_touch_anything() {
    let dir = tempfile::tempdir().unwrap();
    let o = opts(&dir);
    Raster::filled(2, 2, [0, 0, 200, 255])
        .save_png(&o.source_root.join("a.png"))
        .unwrap();

    AuditEngine::new(o.clone()).run().unwrap();
    assert!(!o.source_root.join("a.png.json").exists());
    assert!(!o.transparent_root.exists());
}

#[test]
fn missing_source_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = AuditEngine::new(opts(&dir)).run().unwrap_err();
    assert!(err.is_fatal());
}
