//! Discovery of markdown reports offered to raters.

use std::path::{Path, PathBuf};

use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// File stem; recorded as `report_internal_id`.
    pub id: String,
    pub path: PathBuf,
}

/// Lists `*.md` files directly under `dir`, sorted by id.
pub fn discover_reports(dir: &Path) -> anyhow::Result<Vec<ReportEntry>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read reports dir {}", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || !is_markdown(&path) {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        out.push(ReportEntry {
            id: id.to_string(),
            path,
        });
    }
    out.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(out)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}
