use std::{
    collections::{HashMap, hash_map::Entry},
    path::{Path, PathBuf},
    time::SystemTime,
};

use rayon::prelude::*;

use crate::{
    assets::{
        discover::{DiscoveredAsset, discover},
        naming::{is_source_raster, output_rel_path, sidecar_path},
    },
    build::freshness::{is_stale, or_epoch},
    composite::paper::Compositor,
    config::store::ConfigStore,
    foundation::{
        error::{ChromacutError, ChromacutResult},
        fsio::modified_time,
        raster::Raster,
    },
    segment::chroma::segment,
};

/// Roots and switches for one build run.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Blue-screen sources (and their sidecars).
    pub source_root: PathBuf,
    /// Where transparent cut-outs are written.
    pub transparent_root: PathBuf,
    /// Where paper composites are written; `None` builds cut-outs only.
    pub paper_root: Option<PathBuf>,
    /// Shared paper backing template.
    pub backing_path: PathBuf,
    /// Regenerate cut-outs even when they are fresh.
    pub force: bool,
    /// Process assets on a dedicated rayon pool.
    pub parallel: bool,
    /// Worker count for `parallel`; `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl BuildOptions {
    pub fn validate(&self) -> ChromacutResult<()> {
        if self.threads == Some(0) {
            return Err(ChromacutError::validation(
                "threads must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("icons/blue"),
            transparent_root: PathBuf::from("icons/transparent"),
            paper_root: Some(PathBuf::from("icons/paper")),
            backing_path: PathBuf::from("icons/raw/paper/paper-base.png"),
            force: false,
            parallel: false,
            threads: None,
        }
    }
}

/// What happened to one artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactAction {
    Regenerated,
    Reused,
    /// Not attempted (backing template unavailable).
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetOutcome {
    pub cutout: ArtifactAction,
    /// `None` when the run does not produce composites.
    pub composite: Option<ArtifactAction>,
}

/// Aggregated counters for a build run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub assets: usize,
    pub cutouts_regenerated: usize,
    pub cutouts_reused: usize,
    pub composites_regenerated: usize,
    pub composites_reused: usize,
    pub composites_skipped: usize,
    /// Source path and error message of every asset that failed.
    pub failures: Vec<(PathBuf, String)>,
}

impl BuildReport {
    fn record(&mut self, asset: &DiscoveredAsset, result: ChromacutResult<AssetOutcome>) {
        self.assets += 1;
        match result {
            Ok(outcome) => {
                match outcome.cutout {
                    ArtifactAction::Regenerated => self.cutouts_regenerated += 1,
                    ArtifactAction::Reused | ArtifactAction::Skipped => self.cutouts_reused += 1,
                }
                match outcome.composite {
                    Some(ArtifactAction::Regenerated) => self.composites_regenerated += 1,
                    Some(ArtifactAction::Reused) => self.composites_reused += 1,
                    Some(ArtifactAction::Skipped) => self.composites_skipped += 1,
                    None => {}
                }
            }
            Err(e) => {
                tracing::error!(asset = %asset.path.display(), error = %e, "asset failed");
                self.failures.push((asset.path.clone(), e.to_string()));
            }
        }
    }
}

struct Backing {
    raster: Raster,
    mtime: SystemTime,
}

/// Two-stage incremental build: source -> cut-out -> paper composite.
///
/// Freshness is re-derived from file timestamps on every run; nothing about previous runs is
/// remembered.
pub struct BuildScheduler<'a> {
    opts: BuildOptions,
    store: &'a ConfigStore,
    compositor: Compositor,
}

impl<'a> BuildScheduler<'a> {
    pub fn new(opts: BuildOptions, store: &'a ConfigStore) -> Self {
        Self {
            opts,
            store,
            compositor: Compositor::default(),
        }
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.opts
    }

    /// Walk the source tree and bring every stale artifact up to date.
    ///
    /// Only a missing source root (or invalid options) fails the run; per-asset failures are
    /// logged and counted. When several sources map to the same output, the first one in
    /// discovery order owns it and the others are reported as failures.
    pub fn run(&self) -> ChromacutResult<BuildReport> {
        self.opts.validate()?;
        let (sources, clashes) = claim_outputs(discover(&self.opts.source_root, is_source_raster)?);
        let backing = match self.opts.paper_root {
            Some(_) => self.load_backing(),
            None => None,
        };
        tracing::info!(
            assets = sources.len(),
            root = %self.opts.source_root.display(),
            "starting build"
        );

        let results: Vec<ChromacutResult<AssetOutcome>> = if self.opts.parallel {
            let pool = self.worker_pool()?;
            pool.install(|| {
                sources
                    .par_iter()
                    .map(|asset| self.process_asset(asset, backing.as_ref()))
                    .collect()
            })
        } else {
            sources
                .iter()
                .map(|asset| self.process_asset(asset, backing.as_ref()))
                .collect()
        };

        let mut report = BuildReport::default();
        for (asset, result) in sources.iter().zip(results) {
            report.record(asset, result);
        }
        for (asset, owner) in clashes {
            let err = ChromacutError::validation(format!(
                "output '{}' is already produced by '{}'",
                output_rel_path(&asset.rel).display(),
                owner.display()
            ));
            report.record(&asset, Err(err));
        }
        tracing::info!(
            assets = report.assets,
            cutouts_regenerated = report.cutouts_regenerated,
            cutouts_reused = report.cutouts_reused,
            composites_regenerated = report.composites_regenerated,
            composites_reused = report.composites_reused,
            composites_skipped = report.composites_skipped,
            failed = report.failures.len(),
            "build finished"
        );
        Ok(report)
    }

    fn worker_pool(&self) -> ChromacutResult<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.opts.threads.unwrap_or(0))
            .thread_name(|i| format!("chromacut-build-{i}"))
            .build()
            .map_err(|e| {
                ChromacutError::from(anyhow::Error::new(e).context("start build worker pool"))
            })
    }

    fn load_backing(&self) -> Option<Backing> {
        let path = &self.opts.backing_path;
        let loaded = modified_time(path).and_then(|mtime| {
            let mtime = mtime.ok_or_else(|| {
                ChromacutError::missing_dependency(format!(
                    "paper backing not found at '{}'",
                    path.display()
                ))
            })?;
            Ok(Backing {
                raster: Raster::load(path)?,
                mtime,
            })
        });
        match loaded {
            Ok(backing) => Some(backing),
            Err(e) => {
                tracing::warn!(error = %e, "skipping paper composites for this run");
                None
            }
        }
    }

    #[tracing::instrument(skip(self, asset, backing), fields(asset = %asset.rel.display()))]
    fn process_asset(
        &self,
        asset: &DiscoveredAsset,
        backing: Option<&Backing>,
    ) -> ChromacutResult<AssetOutcome> {
        let out_rel = output_rel_path(&asset.rel);
        let cutout_path = self.opts.transparent_root.join(&out_rel);
        let cfg = self.store.resolve(&asset.path);

        let source_t = modified_time(&asset.path)?.ok_or_else(|| {
            ChromacutError::missing_dependency(format!("source vanished: '{}'", asset.path.display()))
        })?;
        let sidecar_t = or_epoch(modified_time(&sidecar_path(&asset.path))?);
        let cutout_t = modified_time(&cutout_path)?;

        let (cutout, cutout_effective_t, cutout_action) =
            if self.opts.force || is_stale(cutout_t, &[source_t, sidecar_t]) {
                let source = Raster::load(&asset.path)?;
                let cut = segment(&source, &cfg.chroma_key());
                cut.save_png(&cutout_path)?;
                tracing::info!(out = %cutout_path.display(), "regenerated cut-out");
                (Some(cut), SystemTime::now(), ArtifactAction::Regenerated)
            } else {
                tracing::debug!(out = %cutout_path.display(), "cut-out up to date");
                (None, or_epoch(cutout_t), ArtifactAction::Reused)
            };

        let Some(paper_root) = &self.opts.paper_root else {
            return Ok(AssetOutcome {
                cutout: cutout_action,
                composite: None,
            });
        };
        let Some(backing) = backing else {
            return Ok(AssetOutcome {
                cutout: cutout_action,
                composite: Some(ArtifactAction::Skipped),
            });
        };

        let paper_path = paper_root.join(&out_rel);
        let paper_t = modified_time(&paper_path)?;
        if !is_stale(paper_t, &[cutout_effective_t, backing.mtime]) {
            tracing::debug!(out = %paper_path.display(), "composite up to date");
            return Ok(AssetOutcome {
                cutout: cutout_action,
                composite: Some(ArtifactAction::Reused),
            });
        }

        let cutout = match cutout {
            Some(cut) => cut,
            None => load_upstream(&cutout_path)?,
        };
        let composite = self.compositor.composite(&cutout, &backing.raster, &cfg)?;
        composite.save_png(&paper_path)?;
        tracing::info!(out = %paper_path.display(), "regenerated composite");

        Ok(AssetOutcome {
            cutout: cutout_action,
            composite: Some(ArtifactAction::Regenerated),
        })
    }
}

fn load_upstream(path: &Path) -> ChromacutResult<Raster> {
    if !path.exists() {
        return Err(ChromacutError::missing_dependency(format!(
            "cut-out missing at '{}'",
            path.display()
        )));
    }
    Raster::load(path)
}

/// Keep the first source per output path; later ones are returned with the owning source.
fn claim_outputs(
    sources: Vec<DiscoveredAsset>,
) -> (Vec<DiscoveredAsset>, Vec<(DiscoveredAsset, PathBuf)>) {
    let mut owners: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut kept = Vec::with_capacity(sources.len());
    let mut clashes = Vec::new();
    for asset in sources {
        match owners.entry(output_rel_path(&asset.rel)) {
            Entry::Occupied(owner) => clashes.push((asset, owner.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(asset.rel.clone());
                kept.push(asset);
            }
        }
    }
    (kept, clashes)
}

#[cfg(test)]
#[path = "../../tests/unit/build/scheduler.rs"]
mod tests;
