use crate::foundation::{
    error::{ChromacutError, ChromacutResult},
    raster::Rgba8,
};

/// Straight-alpha source-over: `src` on top of `dst`.
///
/// Colour is weighted by each layer's effective coverage and renormalised by the output alpha,
/// which reduces to `src·a + dst·(1 − a)` when `dst` is opaque.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let dst_weight = da * (255 - sa);
    let src_weight = sa * 255;
    let out_a255 = src_weight + dst_weight;
    if out_a255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * src_weight + u32::from(dst[i]) * dst_weight;
        out[i] = ((num + out_a255 / 2) / out_a255).min(255) as u8;
    }
    out[3] = ((out_a255 + 127) / 255).min(255) as u8;
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> ChromacutResult<()> {
    if dst.len() != src.len() || dst.len() % 4 != 0 {
        return Err(ChromacutError::dimension_mismatch(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply every alpha by `factor`, truncating toward zero and clamping to `0..=255`.
pub fn scale_alpha_in_place(rgba: &mut [u8], factor: f64) {
    for px in rgba.chunks_exact_mut(4) {
        let scaled = (f64::from(px[3]) * factor).trunc();
        px[3] = scaled.clamp(0.0, 255.0) as u8;
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
