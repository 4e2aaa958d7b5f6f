use std::path::PathBuf;

use crate::{
    assets::{
        discover::{DiscoveredAsset, discover},
        naming::{is_output_raster, sidecar_path, source_candidates},
    },
    config::store::{ConfigStore, ScaleChange},
    foundation::{
        error::{ChromacutError, ChromacutResult},
        raster::Raster,
    },
    overflow::mask::Mask,
};

/// Knobs for the overflow scan. Defaults match the shipped paper template.
#[derive(Clone, Debug)]
pub struct OverflowOptions {
    /// Paper composites to scan.
    pub paper_root: PathBuf,
    /// Sources whose sidecars receive the correction.
    pub source_root: PathBuf,
    pub backing_path: PathBuf,
    /// Erosion applied to the backing's safe area, in pixels.
    pub margin: u32,
    /// Backing alpha above this is paper.
    pub safe_alpha: u8,
    /// Composite alpha above this is visible.
    pub visible_alpha: u8,
    /// More overflowing pixels than this flags the asset.
    pub max_overflow_pixels: usize,
    /// Scale written into the sidecar of a flagged asset.
    pub target_scale: f64,
}

impl Default for OverflowOptions {
    fn default() -> Self {
        Self {
            paper_root: PathBuf::from("icons/paper"),
            source_root: PathBuf::from("icons/blue"),
            backing_path: PathBuf::from("icons/raw/paper/paper-base.png"),
            margin: 20,
            safe_alpha: 50,
            visible_alpha: 40,
            max_overflow_pixels: 100,
            target_scale: 0.8,
        }
    }
}

/// What was done about a flagged asset's sidecar.
#[derive(Clone, Debug, PartialEq)]
pub enum Correction {
    Applied { from: f64, to: f64 },
    AlreadyWithinTarget { current: f64 },
    NoSidecar,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverflowFinding {
    pub composite: PathBuf,
    pub overflow_pixels: usize,
    /// Sidecar that received (or would have received) the correction.
    pub sidecar: Option<PathBuf>,
    pub correction: Correction,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverflowReport {
    pub checked: usize,
    /// Composites skipped for size mismatch or read errors, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub flagged: Vec<OverflowFinding>,
}

/// Flags composites whose visible footprint leaves the paper's safe area and shrinks their
/// `scale`.
///
/// The correction is idempotent and only ever lowers `scale` to a single fixed target.
pub struct OverflowDetector<'a> {
    opts: OverflowOptions,
    store: &'a ConfigStore,
}

impl<'a> OverflowDetector<'a> {
    pub fn new(opts: OverflowOptions, store: &'a ConfigStore) -> Self {
        Self { opts, store }
    }

    /// Danger mask of `backing`: everything outside its eroded safe area.
    pub fn danger_mask(&self, backing: &Raster) -> Mask {
        Mask::from_alpha(backing, self.opts.safe_alpha)
            .erode(self.opts.margin)
            .invert()
    }

    /// Scan every composite under the paper root.
    ///
    /// Fails if the paper root is missing or the backing template cannot be loaded; individual
    /// composites never fail the scan.
    pub fn run(&self) -> ChromacutResult<OverflowReport> {
        let composites = discover(&self.opts.paper_root, is_output_raster)?;
        if !self.opts.backing_path.exists() {
            return Err(ChromacutError::missing_dependency(format!(
                "paper backing not found at '{}'",
                self.opts.backing_path.display()
            )));
        }
        let backing = Raster::load(&self.opts.backing_path)?;
        let danger = self.danger_mask(&backing);
        tracing::info!(
            composites = composites.len(),
            margin = self.opts.margin,
            "checking composites against eroded paper mask"
        );

        let mut report = OverflowReport::default();
        for asset in &composites {
            report.checked += 1;
            let overflow = match self.overflow_pixels(asset, &danger) {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(composite = %asset.path.display(), error = %e, "skipping composite");
                    report.skipped.push((asset.path.clone(), e.to_string()));
                    continue;
                }
            };
            if overflow <= self.opts.max_overflow_pixels {
                continue;
            }
            report.flagged.push(self.correct(asset, overflow));
        }

        tracing::info!(
            checked = report.checked,
            flagged = report.flagged.len(),
            skipped = report.skipped.len(),
            "overflow scan finished"
        );
        Ok(report)
    }

    fn overflow_pixels(&self, asset: &DiscoveredAsset, danger: &Mask) -> ChromacutResult<usize> {
        let composite = Raster::load(&asset.path)?;
        if composite.dimensions() != danger.dimensions() {
            let (cw, ch) = composite.dimensions();
            let (bw, bh) = danger.dimensions();
            return Err(ChromacutError::dimension_mismatch(format!(
                "composite is {cw}x{ch}, backing is {bw}x{bh}"
            )));
        }
        Mask::from_alpha(&composite, self.opts.visible_alpha).intersection_count(danger)
    }

    fn correct(&self, asset: &DiscoveredAsset, overflow_pixels: usize) -> OverflowFinding {
        let source = source_candidates(&asset.rel)
            .into_iter()
            .map(|rel| self.opts.source_root.join(rel))
            .find(|candidate| sidecar_path(candidate).exists());

        let Some(source) = source else {
            tracing::warn!(composite = %asset.path.display(), overflow_pixels, "overflow, no config found");
            return OverflowFinding {
                composite: asset.path.clone(),
                overflow_pixels,
                sidecar: None,
                correction: Correction::NoSidecar,
            };
        };

        let sidecar = sidecar_path(&source);
        let correction = match self.store.shrink_scale(&source, self.opts.target_scale) {
            Ok(ScaleChange::Applied { from, to }) => {
                tracing::info!(sidecar = %sidecar.display(), from, to, "lowered scale");
                Correction::Applied { from, to }
            }
            Ok(ScaleChange::Unchanged { current }) => {
                tracing::info!(sidecar = %sidecar.display(), current, "scale already within target");
                Correction::AlreadyWithinTarget { current }
            }
            Err(e) => {
                tracing::error!(sidecar = %sidecar.display(), error = %e, "failed to lower scale");
                Correction::Failed(e.to_string())
            }
        };
        OverflowFinding {
            composite: asset.path.clone(),
            overflow_pixels,
            sidecar: Some(sidecar),
            correction,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overflow/detector.rs"]
mod tests;
