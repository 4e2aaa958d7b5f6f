use std::fmt::Write as _;

use crate::audit::{engine::AuditRecord, stats::AuditStatus};

/// How many "good" items are listed by name.
pub const GOOD_SAMPLE: usize = 10;

/// Render audit results as a Markdown report.
pub fn render_markdown(records: &[AuditRecord]) -> String {
    let mut out = String::new();
    let by_status = |status: AuditStatus| -> Vec<&AuditRecord> {
        records.iter().filter(|r| r.status == status).collect()
    };

    let _ = writeln!(out, "# Blue Removal Audit Report\n");
    let _ = writeln!(out, "## Summary");
    for status in AuditStatus::ALL {
        let _ = writeln!(out, "- **{status}**: {} images", by_status(status).len());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Attention Required");
    for status in AuditStatus::ALL.into_iter().filter(|s| *s != AuditStatus::Good) {
        let items = by_status(status);
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {} ({})", status.title(), items.len());
        let _ = writeln!(out, "_{}_\n", status.hint());
        for item in items {
            let _ = writeln!(out, "- `{}` ({})", item.name, item.source.display());
            if let Some(stats) = &item.stats {
                let [r, g, b] = stats.avg_rgb;
                let _ = writeln!(out, "  - Removed: {:.1}%", stats.removed_ratio * 100.0);
                let _ = writeln!(out, "  - Avg Remnant Color: R{r:.0} G{g:.0} B{b:.0}");
            }
            if let Some(err) = &item.error {
                let _ = writeln!(out, "  - Error: {err}");
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## Likely Good");
    let good = by_status(AuditStatus::Good);
    if good.is_empty() {
        let _ = writeln!(out, "No images were classified as good.");
    } else {
        let _ = writeln!(
            out,
            "{} images appear to have been processed reasonably.\n",
            good.len()
        );
        for item in good.iter().take(GOOD_SAMPLE) {
            let _ = writeln!(out, "- `{}`", item.name);
        }
        if good.len() > GOOD_SAMPLE {
            let _ = writeln!(out, "- ... and {} more.", good.len() - GOOD_SAMPLE);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audit/report.rs"]
mod tests;
