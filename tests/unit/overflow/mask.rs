use super::*;

fn naive_erode(mask: &Mask, margin: u32) -> Mask {
    let (w, h) = mask.dimensions();
    let mut out = Mask::new(w, h, false);
    let m = margin as i64;
    for y in 0..h {
        for x in 0..w {
            let mut keep = true;
            for dy in -m..=m {
                for dx in -m..=m {
                    let sx = (i64::from(x) + dx).clamp(0, i64::from(w) - 1) as u32;
                    let sy = (i64::from(y) + dy).clamp(0, i64::from(h) - 1) as u32;
                    keep &= mask.get(sx, sy);
                }
            }
            out.set(x, y, keep);
        }
    }
    out
}

#[test]
fn alpha_threshold_is_strict() {
    let mut r = Raster::transparent(3, 1);
    r.set_pixel(0, 0, [0, 0, 0, 50]);
    r.set_pixel(1, 0, [0, 0, 0, 51]);
    r.set_pixel(2, 0, [0, 0, 0, 255]);
    let m = Mask::from_alpha(&r, 50);
    assert!(!m.get(0, 0));
    assert!(m.get(1, 0));
    assert!(m.get(2, 0));
    assert_eq!(m.count(), 2);
}

#[test]
fn full_mask_survives_erosion() {
    let m = Mask::new(9, 7, true);
    assert_eq!(m.erode(3), m);
}

#[test]
fn single_hole_grows_to_window() {
    let mut m = Mask::new(11, 11, true);
    m.set(5, 5, false);
    let e = m.erode(2);
    assert_eq!(e.count(), 121 - 25);
    assert!(!e.get(3, 3));
    assert!(!e.get(7, 7));
    assert!(e.get(2, 5));
    assert!(e.get(8, 5));
}

#[test]
fn erosion_matches_naive_min_filter() {
    let mut m = Mask::new(17, 13, true);
    let mut seed = 11u32;
    for y in 0..13 {
        for x in 0..17 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            if seed >> 28 == 0 {
                m.set(x, y, false);
            }
        }
    }
    for margin in [0, 1, 2, 5, 20] {
        assert_eq!(m.erode(margin), naive_erode(&m, margin), "margin {margin}");
    }
}

#[test]
fn invert_and_intersect() {
    let mut a = Mask::new(4, 1, false);
    a.set(0, 0, true);
    a.set(1, 0, true);
    let b = a.invert();
    assert_eq!(b.count(), 2);
    assert_eq!(a.intersection_count(&b).unwrap(), 0);
    assert_eq!(a.intersection_count(&a).unwrap(), 2);
    assert!(a.intersection_count(&Mask::new(2, 2, true)).is_err());
}
