use image::imageops::{self, FilterType};

use crate::{
    composite::blend::{
        over_in_place, premultiply_rgba8_in_place, scale_alpha_in_place,
        unpremultiply_rgba8_in_place,
    },
    config::store::AssetConfig,
    foundation::{
        error::{ChromacutError, ChromacutResult},
        raster::Raster,
    },
};

/// Largest resized foreground `composite` accepts, as a multiple of each backing side.
pub const MAX_OVERSIZE: u32 = 4;

/// Largest side `scaled` will allocate.
pub const MAX_SCALED_SIDE: u32 = 16_384;

/// Places a transparent cut-out on the shared paper backing.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    /// Filter used when `scale != 1.0`.
    pub resample: FilterType,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            resample: FilterType::Lanczos3,
        }
    }
}

impl Compositor {
    /// Scale, centre, fade by `paper_alpha`, then composite over `backing`.
    ///
    /// The result always has the backing's dimensions; an oversized foreground is centred with a
    /// negative offset and clipped.
    pub fn composite(
        &self,
        cutout: &Raster,
        backing: &Raster,
        cfg: &AssetConfig,
    ) -> ChromacutResult<Raster> {
        if !cfg.paper_alpha.is_finite() {
            return Err(ChromacutError::validation("paper_alpha must be finite"));
        }
        let (cw, ch) = backing.dimensions();
        let (fw, fh) = scaled_size(cutout.dimensions(), cfg.scale);
        if u64::from(fw) > u64::from(cw) * u64::from(MAX_OVERSIZE)
            || u64::from(fh) > u64::from(ch) * u64::from(MAX_OVERSIZE)
        {
            return Err(ChromacutError::validation(format!(
                "scale {} gives a {fw}x{fh} foreground, more than {MAX_OVERSIZE}x the {cw}x{ch} backing",
                cfg.scale
            )));
        }
        let foreground = self.scaled(cutout, cfg.scale)?;

        let mut layer = image::RgbaImage::new(cw, ch);
        if foreground.width() > 0 && foreground.height() > 0 {
            let (x, y) = centered_offset((cw, ch), foreground.dimensions());
            imageops::replace(&mut layer, &foreground.into_image()?, x, y);
        }

        let mut layer = Raster::from_image(layer);
        scale_alpha_in_place(layer.as_bytes_mut(), cfg.paper_alpha);

        let mut out = backing.clone();
        over_in_place(out.as_bytes_mut(), layer.as_bytes())?;
        Ok(out)
    }

    /// Resize to `round(w·scale) × round(h·scale)`; `scale == 1.0` is a plain copy.
    pub fn scaled(&self, cutout: &Raster, scale: f64) -> ChromacutResult<Raster> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ChromacutError::validation(format!(
                "scale must be finite and > 0, got {scale}"
            )));
        }
        if scale == 1.0 {
            return Ok(cutout.clone());
        }

        let (w, h) = scaled_size(cutout.dimensions(), scale);
        if w > MAX_SCALED_SIDE || h > MAX_SCALED_SIDE {
            return Err(ChromacutError::validation(format!(
                "scale {scale} gives a {w}x{h} raster, limit is {MAX_SCALED_SIDE} per side"
            )));
        }
        if w == 0 || h == 0 || cutout.width() == 0 || cutout.height() == 0 {
            return Ok(Raster::transparent(w, h));
        }

        // Resample premultiplied so fully transparent backdrop colour cannot bleed into edges.
        let mut premul = cutout.clone();
        premultiply_rgba8_in_place(premul.as_bytes_mut());
        let resized = imageops::resize(&premul.into_image()?, w, h, self.resample);
        let mut out = Raster::from_image(resized);
        unpremultiply_rgba8_in_place(out.as_bytes_mut());
        Ok(out)
    }
}

/// `round(w·scale) × round(h·scale)`.
pub fn scaled_size((w, h): (u32, u32), scale: f64) -> (u32, u32) {
    let sw = (f64::from(w) * scale).round().clamp(0.0, f64::from(u32::MAX)) as u32;
    let sh = (f64::from(h) * scale).round().clamp(0.0, f64::from(u32::MAX)) as u32;
    (sw, sh)
}

/// Floor-divided centring offset; negative when the foreground is larger than the canvas.
pub fn centered_offset((cw, ch): (u32, u32), (fw, fh): (u32, u32)) -> (i64, i64) {
    (
        (i64::from(cw) - i64::from(fw)).div_euclid(2),
        (i64::from(ch) - i64::from(fh)).div_euclid(2),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/composite/paper.rs"]
mod tests;
