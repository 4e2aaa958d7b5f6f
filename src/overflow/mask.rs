use crate::foundation::{
    error::{ChromacutError, ChromacutResult},
    raster::Raster,
};

/// Binary per-pixel mask, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![value; width as usize * height as usize],
        }
    }

    /// `true` wherever the raster's alpha is strictly above `threshold`.
    pub fn from_alpha(raster: &Raster, threshold: u8) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            bits: raster.pixels().map(|p| p[3] > threshold).collect(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = y as usize * self.width as usize + x as usize;
        self.bits[i] = value;
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn invert(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    /// Minimum filter over a `(2·margin + 1)²` window, edges replicated.
    ///
    /// A pixel stays `true` only if every pixel within `margin` (Chebyshev distance, clamped to
    /// the image) is `true`.
    pub fn erode(&self, margin: u32) -> Self {
        if margin == 0 || self.bits.is_empty() {
            return self.clone();
        }
        let w = self.width as usize;
        let h = self.height as usize;
        let m = margin as usize;

        let mut tmp = vec![false; self.bits.len()];
        for y in 0..h {
            let row = &self.bits[y * w..(y + 1) * w];
            min_filter_1d(row, &mut tmp[y * w..(y + 1) * w], m);
        }

        let mut out = vec![false; self.bits.len()];
        let mut column = vec![false; h];
        let mut filtered = vec![false; h];
        for x in 0..w {
            for y in 0..h {
                column[y] = tmp[y * w + x];
            }
            min_filter_1d(&column, &mut filtered, m);
            for y in 0..h {
                out[y * w + x] = filtered[y];
            }
        }

        Self {
            width: self.width,
            height: self.height,
            bits: out,
        }
    }

    /// Number of pixels set in both masks.
    pub fn intersection_count(&self, other: &Mask) -> ChromacutResult<usize> {
        if self.dimensions() != other.dimensions() {
            return Err(ChromacutError::dimension_mismatch(format!(
                "mask {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(self
            .bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| **a && **b)
            .count())
    }
}

fn min_filter_1d(src: &[bool], dst: &mut [bool], m: usize) {
    // prefix[i] = number of `false` in src[..i]
    let mut prefix = Vec::with_capacity(src.len() + 1);
    prefix.push(0usize);
    for &b in src {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + usize::from(!b));
    }
    let n = src.len();
    for (i, d) in dst.iter_mut().enumerate() {
        let lo = i.saturating_sub(m);
        let hi = (i + m + 1).min(n);
        *d = prefix[hi] - prefix[lo] == 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overflow/mask.rs"]
mod tests;
