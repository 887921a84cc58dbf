//! The whole run: clear peaks of genes, filter, extend, add orphans.
use std::fmt::{self, Display};

use geneext_core::bridge::genes_to_regions;
use geneext_core::models::{Annotation, AnnotationFormat, Peak};
use geneext_core::{GeneextError, Reported};
use geneext_overlaprs::outersect;

use crate::config::ExtendConfig;
use crate::coverage::filter_by_coverage;
use crate::extend::{ExtendedGene, extend_genes};
use crate::orphan::{assign_orphans, check_orphan_formats};

/// Counts of what each step did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub genes: usize,
    pub input_peaks: usize,
    /// Peaks left after removing those that overlap a gene on their strand.
    pub intergenic_peaks: usize,
    /// Peaks handed to the extender.
    pub used_peaks: usize,
    pub extended_genes: usize,
    /// Genes left unchanged because of a problem with the gene itself.
    pub skipped_genes: usize,
    pub orphan_genes: usize,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} genes, {} peaks ({} intergenic, {} used): ",
            self.genes, self.input_peaks, self.intergenic_peaks, self.used_peaks
        )?;
        write!(
            f,
            "{} genes extended, {} skipped, {} orphan genes added",
            self.extended_genes, self.skipped_genes, self.orphan_genes
        )
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub annotation: Annotation,
    /// The peaks that went into the extension step.
    pub used_peaks: Vec<Peak>,
    pub extended: Vec<ExtendedGene>,
    pub summary: RunSummary,
}

///
/// Run every step on an already loaded annotation and peak set.
///
/// # Arguments
/// - annotation: the genes to extend, in the format they were read as
/// - peaks: all candidate peaks
/// - config: run settings
/// - output_format: what the result will be written as; only matters for
///   orphan peaks
///
/// # Errors
/// - `InvalidParameter` for a bad config
/// - `UnsupportedFormat` when orphans are requested for a format pair that
///   can't hold them
///
pub fn run(
    annotation: &Annotation,
    peaks: Vec<Peak>,
    config: &ExtendConfig,
    output_format: AnnotationFormat,
) -> Result<Reported<PipelineOutput>, GeneextError> {
    config.validate()?;
    if config.orphan {
        check_orphan_formats(annotation.format, output_format)?;
    }

    let mut diagnostics = Vec::new();
    let mut summary = RunSummary {
        input_peaks: peaks.len(),
        ..Default::default()
    };

    let genes = genes_to_regions(annotation).drain_into(&mut diagnostics);
    summary.genes = genes.len();
    if genes.is_empty() {
        log::warn!("No genes found in the annotation, nothing will be extended.");
    }

    let intergenic = outersect(peaks, &genes, true);
    summary.intergenic_peaks = intergenic.len();
    log::info!(
        "{} of {} peaks don't overlap genes",
        intergenic.len(),
        summary.input_peaks
    );

    let used = if config.filter_coverage {
        let kept = filter_by_coverage(intergenic, config.coverage_percentile)?;
        log::info!(
            "{} peaks pass the coverage percentile {}",
            kept.len(),
            config.coverage_percentile
        );
        kept
    } else {
        intergenic
    };
    summary.used_peaks = used.len();

    log::info!(
        "Extending genes by up to {} bp ({})",
        config.max_dist,
        config.extension_mode
    );
    let extension = extend_genes(annotation, &used, config)?;
    summary.skipped_genes = extension.diagnostics.len();
    let extension = extension.drain_into(&mut diagnostics);
    summary.extended_genes = extension.extended.len();

    let mut result = extension.annotation;
    if config.orphan {
        let orphans = assign_orphans(
            &used,
            &result,
            &config.tag,
            annotation.format,
            output_format,
        )?;
        // gene + transcript + exon per peak
        summary.orphan_genes = orphans.iter().filter(|f| f.is_gene()).count();
        log::info!("Adding {} orphan peaks as genes", summary.orphan_genes);

        let mut features = result.into_features();
        features.extend(orphans);
        result = Annotation::from_features(annotation.format, features);
    }

    log::info!("{}", summary);
    if !diagnostics.is_empty() {
        log::warn!("{} records were skipped or flagged", diagnostics.len());
    }

    Ok(Reported::with_diagnostics(
        PipelineOutput {
            annotation: result,
            used_peaks: used,
            extended: extension.extended,
            summary,
        },
        diagnostics,
    ))
}
