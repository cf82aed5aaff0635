use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tad_core::Snapshot;

/// Writes the assembled report for a finished run under
/// `<results_dir>/<ticker>/<date>/final_report.md`. Returns `None` when the
/// run produced no report sections at all.
pub fn export_final_report(
    snapshot: &Snapshot,
    results_dir: &Path,
    ticker: &str,
    date: &str,
) -> Result<Option<PathBuf>> {
    let Some(report) = snapshot.assembled_report() else {
        return Ok(None);
    };
    let dir = results_dir.join(ticker).join(date);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating results directory {}", dir.display()))?;
    let path = dir.join("final_report.md");
    fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}
