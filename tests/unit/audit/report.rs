use std::path::PathBuf;

use super::*;
use crate::audit::stats::{AuditStats, removed_ratio};

fn record(name: &str, status: AuditStatus, stats: Option<AuditStats>) -> AuditRecord {
    AuditRecord {
        name: name.to_string(),
        source: PathBuf::from("icons/blue").join(name),
        output: PathBuf::from("icons/transparent").join(name),
        status,
        stats,
        error: None,
    }
}

fn stats(opaque_in: usize, opaque_out: usize, avg_rgb: [f64; 3]) -> AuditStats {
    AuditStats {
        opaque_in,
        opaque_out,
        removed_ratio: removed_ratio(opaque_in, opaque_out),
        avg_rgb,
    }
}

#[test]
fn summary_counts_every_category() {
    let records = vec![
        record("a.png", AuditStatus::Good, Some(stats(10, 5, [1.0, 2.0, 3.0]))),
        record("b.png", AuditStatus::Empty, Some(stats(10, 0, [0.0; 3]))),
        record("c.png", AuditStatus::MissingOutput, None),
    ];
    let md = render_markdown(&records);
    assert!(md.starts_with("# Blue Removal Audit Report\n"));
    assert!(md.contains("- **good**: 1 images"));
    assert!(md.contains("- **empty**: 1 images"));
    assert!(md.contains("- **missing_output**: 1 images"));
    assert!(md.contains("- **residual_blue**: 0 images"));
}

#[test]
fn attention_items_carry_details() {
    let mut err = record("bad.png", AuditStatus::Error, None);
    err.error = Some("invalid image: junk".to_string());
    let records = vec![
        record(
            "tint.png",
            AuditStatus::ResidualBlue,
            Some(stats(200, 100, [10.0, 20.4, 180.6])),
        ),
        err,
    ];
    let md = render_markdown(&records);
    assert!(md.contains("### Residual Blue (1)"));
    assert!(md.contains("- `tint.png` (icons/blue/tint.png)"));
    assert!(md.contains("  - Removed: 50.0%"));
    assert!(md.contains("  - Avg Remnant Color: R10 G20 B181"));
    assert!(md.contains("### Error (1)"));
    assert!(md.contains("  - Error: invalid image: junk"));
    assert!(!md.contains("### Untouched"));
}

#[test]
fn good_sample_is_truncated() {
    let records: Vec<_> = (0..13)
        .map(|i| record(&format!("g{i:02}.png"), AuditStatus::Good, Some(stats(4, 2, [0.0; 3]))))
        .collect();
    let md = render_markdown(&records);
    assert!(md.contains("13 images appear to have been processed reasonably."));
    assert!(md.contains("- `g09.png`"));
    assert!(!md.contains("- `g10.png`"));
    assert!(md.contains("- ... and 3 more."));
    assert!(!md.contains("### Good"));
}
