use super::*;

fn cfg(scale: f64, paper_alpha: f64) -> AssetConfig {
    AssetConfig {
        scale,
        paper_alpha,
        ..AssetConfig::default()
    }
}

#[test]
fn output_matches_backing_size() {
    let backing = Raster::filled(8, 6, [240, 230, 200, 255]);
    for cut in [Raster::filled(2, 2, [0, 0, 0, 255]), Raster::filled(20, 3, [0, 0, 0, 255])] {
        let out = Compositor::default()
            .composite(&cut, &backing, &cfg(1.0, 0.6))
            .unwrap();
        assert_eq!(out.dimensions(), (8, 6));
    }
}

#[test]
fn centres_with_floor_division() {
    assert_eq!(centered_offset((8, 8), (3, 3)), (2, 2));
    assert_eq!(centered_offset((4, 4), (7, 7)), (-2, -2));
    assert_eq!(centered_offset((4, 4), (4, 4)), (0, 0));
}

#[test]
fn scaled_size_rounds() {
    assert_eq!(scaled_size((10, 5), 0.8), (8, 4));
    assert_eq!(scaled_size((3, 3), 0.5), (2, 2));
    assert_eq!(scaled_size((1, 1), 0.1), (0, 0));
}

#[test]
fn opaque_foreground_is_faded_over_paper() {
    let backing = Raster::filled(4, 4, [100, 100, 100, 255]);
    let mut cut = Raster::transparent(2, 2);
    for y in 0..2 {
        for x in 0..2 {
            cut.set_pixel(x, y, [200, 0, 0, 255]);
        }
    }

    let out = Compositor::default()
        .composite(&cut, &backing, &cfg(1.0, 0.6))
        .unwrap();
    // alpha 255·0.6 = 153 -> 200·0.6 + 100·0.4 = 160, 0·0.6 + 100·0.4 = 40
    assert_eq!(out.pixel(1, 1), [160, 40, 40, 255]);
    assert_eq!(out.pixel(0, 0), [100, 100, 100, 255]);
    assert_eq!(out.pixel(3, 3), [100, 100, 100, 255]);
}

#[test]
fn transparent_cutout_leaves_backing_untouched() {
    let backing = Raster::filled(5, 5, [1, 2, 3, 200]);
    let cut = Raster::filled(5, 5, [0, 0, 255, 0]);
    let out = Compositor::default()
        .composite(&cut, &backing, &cfg(1.0, 0.8))
        .unwrap();
    assert_eq!(out, backing);
}

#[test]
fn oversized_foreground_is_clipped() {
    let backing = Raster::filled(4, 4, [0, 0, 0, 255]);
    let cut = Raster::filled(8, 8, [255, 255, 255, 255]);
    let out = Compositor::default()
        .composite(&cut, &backing, &cfg(1.0, 1.0))
        .unwrap();
    assert!(out.pixels().all(|p| p == [255, 255, 255, 255]));
}

#[test]
fn downscale_shrinks_footprint() {
    let backing = Raster::filled(20, 20, [0, 0, 0, 255]);
    let cut = Raster::filled(20, 20, [255, 255, 255, 255]);
    let out = Compositor::default()
        .composite(&cut, &backing, &cfg(0.5, 1.0))
        .unwrap();
    // 10x10 centred at offset 5.
    assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(out.pixel(4, 4), [0, 0, 0, 255]);
    assert_eq!(out.pixel(10, 10), [255, 255, 255, 255]);
    assert_eq!(out.pixel(15, 15), [0, 0, 0, 255]);
}

#[test]
fn rejects_non_positive_scale() {
    let backing = Raster::filled(2, 2, [0, 0, 0, 255]);
    let cut = Raster::filled(2, 2, [0, 0, 0, 255]);
    let err = Compositor::default()
        .composite(&cut, &backing, &cfg(0.0, 0.6))
        .unwrap_err();
    assert!(matches!(err, ChromacutError::Validation(_)));
}

#[test]
fn rejects_scale_far_beyond_backing() {
    let backing = Raster::filled(8, 8, [0, 0, 0, 255]);
    let cut = Raster::filled(8, 8, [255, 255, 255, 255]);
    let err = Compositor::default()
        .composite(&cut, &backing, &cfg(100.0, 0.6))
        .unwrap_err();
    assert!(matches!(err, ChromacutError::Validation(_)));

    let out = Compositor::default()
        .composite(&cut, &backing, &cfg(4.0, 0.6))
        .unwrap();
    assert_eq!(out.dimensions(), (8, 8));
}

#[test]
fn scaled_refuses_huge_allocations() {
    let cut = Raster::transparent(512, 512);
    let err = Compositor::default().scaled(&cut, 100.0).unwrap_err();
    assert!(matches!(err, ChromacutError::Validation(_)));
}

#[test]
fn compositing_is_deterministic() {
    let backing = Raster::filled(16, 16, [250, 240, 220, 255]);
    let mut cut = Raster::transparent(12, 12);
    for y in 0..12 {
        for x in 0..12 {
            cut.set_pixel(x, y, [(x * 20) as u8, (y * 20) as u8, 30, if (x + y) % 3 == 0 { 0 } else { 255 }]);
        }
    }
    let c = cfg(0.8, 0.6);
    let a = Compositor::default().composite(&cut, &backing, &c).unwrap();
    let b = Compositor::default().composite(&cut, &backing, &c).unwrap();
    assert_eq!(a.encode_png().unwrap(), b.encode_png().unwrap());
}
