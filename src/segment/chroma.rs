use rayon::prelude::*;

use crate::foundation::raster::{Raster, Rgba8};

/// Blue-screen thresholds. See [`ChromaKey::classify`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromaKey {
    /// Minimum blue level for the saturated-blue rule.
    pub blue_threshold: i64,
    /// How much blue must dominate red and green for the saturated-blue rule.
    pub blue_ratio: f64,
    /// Minimum blue level for the shadow rule.
    pub dark_blue_min: i64,
    /// Red and green must stay below this for the shadow rule.
    pub dark_component_max: i64,
}

impl Default for ChromaKey {
    fn default() -> Self {
        Self {
            blue_threshold: 60,
            blue_ratio: 1.1,
            dark_blue_min: 40,
            dark_component_max: 80,
        }
    }
}

/// Per-pixel verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelClass {
    Foreground,
    /// Saturated backdrop blue.
    Blue,
    /// Blue-tinted shadow that the saturated rule misses.
    DarkBlue,
}

impl PixelClass {
    pub fn is_background(self) -> bool {
        !matches!(self, Self::Foreground)
    }
}

impl ChromaKey {
    /// `B > threshold` and blue dominates both other channels by `blue_ratio`.
    pub fn is_blue(&self, px: Rgba8) -> bool {
        let [r, g, b, _] = px;
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        i64::from(b) > self.blue_threshold
            && bf > rf * self.blue_ratio
            && bf > gf * self.blue_ratio
    }

    /// Dark pixel whose blue still beats red and green.
    pub fn is_dark_blue(&self, px: Rgba8) -> bool {
        let [r, g, b, _] = px;
        i64::from(b) > self.dark_blue_min
            && i64::from(r) < self.dark_component_max
            && i64::from(g) < self.dark_component_max
            && b > r
            && b > g
    }

    pub fn classify(&self, px: Rgba8) -> PixelClass {
        if self.is_blue(px) {
            PixelClass::Blue
        } else if self.is_dark_blue(px) {
            PixelClass::DarkBlue
        } else {
            PixelClass::Foreground
        }
    }
}

/// Cut the backdrop out of `source`.
///
/// Background pixels get alpha 0 with their colour channels untouched; every other pixel is
/// copied byte-for-byte. Rows are processed in parallel.
pub fn segment(source: &Raster, key: &ChromaKey) -> Raster {
    let mut out = source.clone();
    segment_in_place(&mut out, key);
    out
}

/// In-place variant of [`segment`]; returns the number of pixels made transparent.
pub fn segment_in_place(raster: &mut Raster, key: &ChromaKey) -> usize {
    let row_bytes = raster.width() as usize * 4;
    if row_bytes == 0 {
        return 0;
    }
    raster
        .as_bytes_mut()
        .par_chunks_mut(row_bytes)
        .map(|row| {
            let mut cleared = 0usize;
            for px in row.chunks_exact_mut(4) {
                if key.classify([px[0], px[1], px[2], px[3]]).is_background() {
                    if px[3] != 0 {
                        cleared += 1;
                    }
                    px[3] = 0;
                }
            }
            cleared
        })
        .sum()
}

#[cfg(test)]
#[path = "../../tests/unit/segment/chroma.rs"]
mod tests;
