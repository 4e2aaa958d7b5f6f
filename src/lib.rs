//! chromacut turns blue-screen raster assets into transparent cut-outs, composites them onto a
//! shared paper backing, and audits/corrects the results.
//!
//! # Pipeline overview
//!
//! 1. **Configure**: each source carries a JSON sidecar resolved by [`ConfigStore`]
//! 2. **Segment**: [`segment`] keys out saturated blue and blue-tinted shadow pixels
//! 3. **Composite**: [`Compositor`] scales, centres and fades the cut-out over the paper
//! 4. **Schedule**: [`BuildScheduler`] regenerates only artifacts older than their inputs
//! 5. **Audit**: [`AuditEngine`] classifies every cut-out; [`render_markdown`] reports it
//! 6. **Correct**: [`OverflowDetector`] shrinks `scale` for composites bleeding off the paper
//!
//! Every stage is best-effort per asset: one asset's failure is logged (or recorded as an
//! audit outcome) and the batch continues. Only a missing root directory stops a run.
#![forbid(unsafe_code)]

mod assets;
mod audit;
mod build;
mod composite;
mod config;
mod foundation;
mod overflow;
mod segment;

pub use assets::discover::{DiscoveredAsset, discover};
pub use assets::naming::{
    BlueToken, OUTPUT_EXTENSION, SOURCE_EXTENSIONS, is_output_raster, is_source_raster,
    output_file_name, output_rel_path, sidecar_path, source_candidates, strip_blue_token,
};
pub use audit::engine::{AuditEngine, AuditOptions, AuditRecord};
pub use audit::report::{GOOD_SAMPLE, render_markdown};
pub use audit::stats::{AuditStats, AuditStatus, removed_ratio};
pub use build::freshness::{is_stale, or_epoch};
pub use build::scheduler::{
    ArtifactAction, AssetOutcome, BuildOptions, BuildReport, BuildScheduler,
};
pub use composite::blend::{over, over_in_place, scale_alpha_in_place};
pub use composite::paper::{
    Compositor, MAX_OVERSIZE, MAX_SCALED_SIDE, centered_offset, scaled_size,
};
pub use config::store::{
    AssetConfig, ConfigDefaults, ConfigStore, KNOWN_KEYS, ScaleChange, SidecarRecord,
};
pub use foundation::error::{ChromacutError, ChromacutResult};
pub use foundation::fsio::{ensure_parent_dir, modified_time, write_atomic};
pub use foundation::raster::{Raster, Rgba8};
pub use overflow::detector::{
    Correction, OverflowDetector, OverflowFinding, OverflowOptions, OverflowReport,
};
pub use overflow::mask::Mask;
pub use segment::chroma::{ChromaKey, PixelClass, segment, segment_in_place};
