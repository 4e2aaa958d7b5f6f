use std::path::PathBuf;

use crate::{
    assets::{
        discover::{DiscoveredAsset, discover},
        naming::{is_source_raster, output_rel_path},
    },
    audit::stats::{AuditStats, AuditStatus},
    foundation::{error::ChromacutResult, raster::Raster},
};

#[derive(Clone, Debug)]
pub struct AuditOptions {
    pub source_root: PathBuf,
    pub transparent_root: PathBuf,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("icons/blue"),
            transparent_root: PathBuf::from("icons/transparent"),
        }
    }
}

/// Per-asset audit result. Recomputed on every run, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditRecord {
    /// Cut-out file name.
    pub name: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub status: AuditStatus,
    /// Present whenever both rasters could be read.
    pub stats: Option<AuditStats>,
    /// Present for [`AuditStatus::Error`].
    pub error: Option<String>,
}

/// Read-only quality pass over sources and their cut-outs.
pub struct AuditEngine {
    opts: AuditOptions,
}

impl AuditEngine {
    pub fn new(opts: AuditOptions) -> Self {
        Self { opts }
    }

    /// Audit every source under the source root. Fails only if that root is missing.
    pub fn run(&self) -> ChromacutResult<Vec<AuditRecord>> {
        let sources = discover(&self.opts.source_root, is_source_raster)?;
        let records: Vec<_> = sources.iter().map(|asset| self.audit_one(asset)).collect();
        tracing::info!(assets = records.len(), "audit finished");
        Ok(records)
    }

    fn audit_one(&self, asset: &DiscoveredAsset) -> AuditRecord {
        let out_rel = output_rel_path(&asset.rel);
        let output = self.opts.transparent_root.join(&out_rel);
        let name = out_rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut record = AuditRecord {
            name,
            source: asset.path.clone(),
            output,
            status: AuditStatus::MissingOutput,
            stats: None,
            error: None,
        };

        if !record.output.exists() {
            return record;
        }

        let loaded = Raster::load(&record.source)
            .and_then(|src| Raster::load(&record.output).map(|out| (src, out)));
        match loaded {
            Ok((src, out)) => {
                let stats = AuditStats::compute(&src, &out);
                record.status = stats.classify();
                record.stats = Some(stats);
            }
            Err(e) => {
                tracing::warn!(source = %record.source.display(), error = %e, "audit failed");
                record.status = AuditStatus::Error;
                record.error = Some(e.to_string());
            }
        }
        record
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audit/engine.rs"]
mod tests;
