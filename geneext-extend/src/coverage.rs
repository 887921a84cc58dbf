//! Drop low-signal peaks before they can extend anything.
use geneext_core::GeneextError;
use geneext_core::models::Peak;

use crate::config::check_percentile;

///
/// Percentile of `values` with linear interpolation between closest ranks
/// (`rank = p / 100 * (n - 1)`).
///
/// # Arguments
/// - values: any order, must not be empty
/// - p: percentile in [0, 100]
///
/// # Returns
/// - `None` for empty input
///
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

///
/// Keep peaks whose coverage reaches the given percentile of all coverages.
///
/// Fewer than two peaks have no meaningful distribution and all pass.
///
pub fn filter_by_coverage(peaks: Vec<Peak>, p: f64) -> Result<Vec<Peak>, GeneextError> {
    check_percentile(p)?;
    if peaks.len() < 2 {
        return Ok(peaks);
    }

    let coverages: Vec<f64> = peaks.iter().map(|peak| peak.coverage).collect();
    let threshold = match percentile(&coverages, p) {
        Some(threshold) => threshold,
        None => return Ok(peaks),
    };
    log::debug!(
        "coverage threshold at percentile {}: {} ({} peaks)",
        p,
        threshold,
        peaks.len()
    );

    Ok(peaks
        .into_iter()
        .filter(|peak| peak.coverage >= threshold)
        .collect())
}
