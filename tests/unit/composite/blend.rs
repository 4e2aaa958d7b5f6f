use super::*;

#[test]
fn transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn opaque_src_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_transparent_dst_returns_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src), src);
}

#[test]
fn half_alpha_over_opaque_is_linear_mix() {
    // a = 102/255 = 0.4; 200·0.4 + 50·0.6 = 110
    let out = over([50, 50, 50, 255], [200, 200, 200, 102]);
    assert_eq!(out, [110, 110, 110, 255]);
}

#[test]
fn output_alpha_accumulates() {
    // 0.5 + 0.5·0.5 = 0.75
    let out = over([0, 0, 0, 128], [0, 0, 0, 128]);
    assert!((i32::from(out[3]) - 191).abs() <= 1);
}

#[test]
fn over_in_place_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn scale_alpha_truncates() {
    let mut px = vec![1, 2, 3, 255, 4, 5, 6, 3, 7, 8, 9, 0];
    scale_alpha_in_place(&mut px, 0.6);
    assert_eq!(px, vec![1, 2, 3, 153, 4, 5, 6, 1, 7, 8, 9, 0]);
}

#[test]
fn scale_alpha_clamps() {
    let mut px = vec![0, 0, 0, 200];
    scale_alpha_in_place(&mut px, 2.0);
    assert_eq!(px[3], 255);
    scale_alpha_in_place(&mut px, -1.0);
    assert_eq!(px[3], 0);
}

#[test]
fn premultiply_roundtrip_keeps_opaque_and_clears_transparent() {
    let mut px = vec![100, 50, 200, 255, 100, 50, 200, 0, 200, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..8], &[100, 50, 200, 255, 0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 200, 255]);
    for (got, want) in px[8..11].iter().zip([200u8, 100, 50]) {
        assert!((i32::from(*got) - i32::from(want)).abs() <= 1);
    }
}
