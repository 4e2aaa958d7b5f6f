use std::fmt;

use crate::foundation::raster::Raster;

/// Below this removed fraction the backdrop was probably not keyed at all.
pub const UNTOUCHED_MAX_RATIO: f64 = 0.05;
/// Above this removed fraction the subject itself was probably eaten.
pub const OVERKILL_MIN_RATIO: f64 = 0.95;
/// Blue must beat red and green by this factor to count as a residual tint.
pub const RESIDUAL_BLUE_DOMINANCE: f64 = 1.05;
/// Minimum average blue for a residual tint.
pub const RESIDUAL_BLUE_MIN: f64 = 50.0;

/// Quality verdict for one cut-out. Exactly one applies per asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuditStatus {
    Good,
    ResidualBlue,
    Untouched,
    Empty,
    SuspectOverkill,
    MissingOutput,
    Error,
}

impl AuditStatus {
    /// Report order.
    pub const ALL: [AuditStatus; 7] = [
        AuditStatus::Good,
        AuditStatus::ResidualBlue,
        AuditStatus::Untouched,
        AuditStatus::Empty,
        AuditStatus::SuspectOverkill,
        AuditStatus::MissingOutput,
        AuditStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::ResidualBlue => "residual_blue",
            Self::Untouched => "untouched",
            Self::Empty => "empty",
            Self::SuspectOverkill => "suspect_overkill",
            Self::MissingOutput => "missing_output",
            Self::Error => "error",
        }
    }

    /// Human heading, e.g. `Residual Blue`.
    pub fn title(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::ResidualBlue => "Residual Blue",
            Self::Untouched => "Untouched",
            Self::Empty => "Empty",
            Self::SuspectOverkill => "Suspect Overkill",
            Self::MissingOutput => "Missing Output",
            Self::Error => "Error",
        }
    }

    /// What the category usually means for the thresholds.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Good => "Removal looks reasonable.",
            Self::ResidualBlue => {
                "The output still appears to be blue-tinted. Thresholds might be too low."
            }
            Self::Untouched => {
                "Less than 5% of the image was removed. Thresholds might be too strict (high)."
            }
            Self::Empty => "The entire image was removed. Thresholds might be too loose (low).",
            Self::SuspectOverkill => {
                "More than 95% of the image was removed. Likely destroyed the subject."
            }
            Self::MissingOutput => "No cut-out exists for this source. Run the build first.",
            Self::Error => "Processing errors.",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbers the classification is computed from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuditStats {
    /// Source pixels with alpha > 0.
    pub opaque_in: usize,
    /// Cut-out pixels with alpha > 0.
    pub opaque_out: usize,
    /// `(opaque_in - opaque_out) / opaque_in`, 0 when the source has no opaque pixels.
    pub removed_ratio: f64,
    /// Mean RGB over the cut-out's opaque pixels; zero when there are none.
    pub avg_rgb: [f64; 3],
}

impl AuditStats {
    pub fn compute(source: &Raster, output: &Raster) -> Self {
        let opaque_in = source.opaque_count();
        let mut opaque_out = 0usize;
        let mut sums = [0u64; 3];
        for px in output.pixels().filter(|p| p[3] > 0) {
            opaque_out += 1;
            for (sum, c) in sums.iter_mut().zip(px) {
                *sum += u64::from(c);
            }
        }
        let avg_rgb = if opaque_out == 0 {
            [0.0; 3]
        } else {
            let n = opaque_out as f64;
            [sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n]
        };
        Self {
            opaque_in,
            opaque_out,
            removed_ratio: removed_ratio(opaque_in, opaque_out),
            avg_rgb,
        }
    }

    /// `true` when the surviving pixels still lean blue.
    pub fn is_blueish(&self) -> bool {
        let [r, g, b] = self.avg_rgb;
        b > r * RESIDUAL_BLUE_DOMINANCE && b > g * RESIDUAL_BLUE_DOMINANCE && b > RESIDUAL_BLUE_MIN
    }

    /// First matching rule wins: empty, untouched, residual blue, overkill, good.
    pub fn classify(&self) -> AuditStatus {
        if self.opaque_out == 0 {
            AuditStatus::Empty
        } else if self.removed_ratio < UNTOUCHED_MAX_RATIO {
            AuditStatus::Untouched
        } else if self.is_blueish() {
            AuditStatus::ResidualBlue
        } else if self.removed_ratio > OVERKILL_MIN_RATIO {
            AuditStatus::SuspectOverkill
        } else {
            AuditStatus::Good
        }
    }
}

/// Fraction of the source's opaque pixels that the cut-out removed, in `[0, 1]`.
pub fn removed_ratio(opaque_in: usize, opaque_out: usize) -> f64 {
    if opaque_in == 0 {
        return 0.0;
    }
    opaque_in.saturating_sub(opaque_out) as f64 / opaque_in as f64
}

#[cfg(test)]
#[path = "../../tests/unit/audit/stats.rs"]
mod tests;
