//! Extend genes at their 3' end into the farthest downstream peak in reach.
//!
//! Every gene is looked at on its own strand: on `+` the 3' end is `end` and
//! the search runs towards higher coordinates, on `-` it is `start` and the
//! search runs towards lower ones. Among the peaks that start (on `+`) or end
//! (on `-`) within `max_dist` of the 3' end, the one reaching farthest
//! downstream wins. The added length never exceeds `max_dist`.
use std::collections::HashMap;

use rayon::prelude::*;

use geneext_core::models::{Annotation, AnnotationFormat, GeneFeature, Peak, Region, Strand};
use geneext_core::{Diagnostic, GeneextError, Reported};

use crate::config::{ExtendConfig, ExtensionMode, PROVENANCE_ATTRIBUTE};

/// What happened to one extended gene.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedGene {
    pub gene_id: String,
    pub peak_id: String,
    pub old_boundary: u64,
    pub new_boundary: u64,
    /// The record that carries the extension: the new or rewritten
    /// transcript, or the tagged copy of a childless gene.
    pub feature_id: String,
}

impl ExtendedGene {
    pub fn added_length(&self) -> u64 {
        self.new_boundary.abs_diff(self.old_boundary)
    }
}

#[derive(Debug, Clone)]
pub struct Extension {
    pub annotation: Annotation,
    pub extended: Vec<ExtendedGene>,
}

/// Peaks of one strand of one chromosome, sorted for range lookups.
#[derive(Default)]
struct StrandPeaks<'a> {
    by_start: Vec<&'a Peak>,
    by_end: Vec<&'a Peak>,
}

impl<'a> StrandPeaks<'a> {
    fn push(&mut self, peak: &'a Peak) {
        self.by_start.push(peak);
        self.by_end.push(peak);
    }

    fn sort(&mut self) {
        self.by_start
            .sort_by_key(|p| (p.region.start, p.region.end));
        self.by_end.sort_by_key(|p| (p.region.end, p.region.start));
    }

    /// Best peak starting in (boundary, boundary + max_dist].
    fn downstream_of_end(&self, boundary: u64, max_dist: u64) -> Option<&'a Peak> {
        let limit = boundary.saturating_add(max_dist);
        let lo = self.by_start.partition_point(|p| p.region.start <= boundary);
        let hi = self.by_start.partition_point(|p| p.region.start <= limit);
        farthest(&self.by_start[lo..hi], Strand::Plus)
    }

    /// Best peak ending in [boundary - max_dist, boundary).
    fn downstream_of_start(&self, boundary: u64, max_dist: u64) -> Option<&'a Peak> {
        let limit = boundary.saturating_sub(max_dist);
        let lo = self.by_end.partition_point(|p| p.region.end < limit);
        let hi = self.by_end.partition_point(|p| p.region.end < boundary);
        farthest(&self.by_end[lo..hi], Strand::Minus)
    }
}

#[derive(Default)]
struct ChromPeaks<'a> {
    plus: StrandPeaks<'a>,
    minus: StrandPeaks<'a>,
}

/// Unstranded peaks can't support an extension and are left out.
fn index_peaks(peaks: &[Peak]) -> HashMap<&str, ChromPeaks<'_>> {
    let mut index: HashMap<&str, ChromPeaks> = HashMap::new();
    for peak in peaks {
        let chrom = index.entry(peak.region.chr.as_str()).or_default();
        match peak.region.strand {
            Strand::Plus => chrom.plus.push(peak),
            Strand::Minus => chrom.minus.push(peak),
            Strand::Unknown => {}
        }
    }
    for chrom in index.values_mut() {
        chrom.plus.sort();
        chrom.minus.sort();
    }
    index
}

///
/// Is `a` farther downstream than `b`? Equal outer boundaries are decided by
/// the longer span; a full tie is not "farther", so the first seen stays.
///
fn is_farther(a: &Region, b: &Region, strand: Strand) -> bool {
    match strand {
        Strand::Minus => a.start < b.start || (a.start == b.start && a.width() > b.width()),
        _ => a.end > b.end || (a.end == b.end && a.width() > b.width()),
    }
}

fn farthest<'a>(candidates: &[&'a Peak], strand: Strand) -> Option<&'a Peak> {
    let mut best: Option<&'a Peak> = None;
    for &peak in candidates {
        best = match best {
            Some(current) if !is_farther(&peak.region, &current.region, strand) => Some(current),
            _ => Some(peak),
        };
    }
    best
}

fn farthest_feature(annotation: &Annotation, indices: &[usize], strand: Strand) -> Option<usize> {
    let features = annotation.features();
    let mut best: Option<usize> = None;
    for &idx in indices {
        best = match best {
            Some(current)
                if !is_farther(&features[idx].region, &features[current].region, strand) =>
            {
                Some(current)
            }
            _ => Some(idx),
        };
    }
    best
}

///
/// Pick the peak a gene grows into and the clipped new 3' boundary.
///
fn find_extension<'a>(
    peaks: &ChromPeaks<'a>,
    gene: &Region,
    max_dist: u64,
) -> Option<(&'a Peak, u64)> {
    match gene.strand {
        Strand::Plus => peaks
            .plus
            .downstream_of_end(gene.end, max_dist)
            .map(|peak| (peak, peak.region.end.min(gene.end.saturating_add(max_dist)))),
        Strand::Minus => peaks
            .minus
            .downstream_of_start(gene.start, max_dist)
            .map(|peak| (peak, peak.region.start.max(gene.start.saturating_sub(max_dist)))),
        Strand::Unknown => None,
    }
}

/// Move the 3' end of `feature` to `boundary`.
fn move_three_prime(feature: &mut GeneFeature, strand: Strand, boundary: u64) {
    match strand {
        Strand::Minus => feature.set_bounds(boundary, feature.region.end),
        _ => feature.set_bounds(feature.region.start, boundary),
    }
}

fn tagged(feature: &GeneFeature, tag: &str) -> GeneFeature {
    let mut copy = feature.detached();
    copy.source = tag.to_string();
    copy.attributes.set(PROVENANCE_ATTRIBUTE, tag);
    copy
}

/// The rewrite of one gene, applied when the output is assembled.
struct GeneEdit {
    gene: usize,
    /// Last record of the gene in file order; new records go right after it.
    anchor: usize,
    replacements: Vec<(usize, GeneFeature)>,
    added: Vec<GeneFeature>,
    summary: ExtendedGene,
}

#[derive(Default)]
struct ChromOutcome {
    edits: Vec<GeneEdit>,
    diagnostics: Vec<Diagnostic>,
}

fn extend_gene(
    annotation: &Annotation,
    gene: usize,
    peaks: Option<&ChromPeaks>,
    config: &ExtendConfig,
) -> Result<Option<GeneEdit>, Diagnostic> {
    let features = annotation.features();
    let format = annotation.format;
    let tag = config.tag.as_str();
    let gene_feature = &features[gene];
    let strand = gene_feature.region.strand;

    let old_boundary = match gene_feature.region.three_prime() {
        Some(boundary) => boundary,
        None => {
            return Err(Diagnostic::warning(GeneextError::malformed(
                gene_feature.id(),
                "gene has no strand and can't be extended",
            )));
        }
    };

    let found = peaks.and_then(|p| find_extension(p, &gene_feature.region, config.max_dist));
    let (peak, boundary) = match found {
        Some(found) => found,
        None => return Ok(None),
    };

    annotation.check_nesting(gene).map_err(Diagnostic::error)?;

    let anchor = annotation
        .descendants(gene)
        .last()
        .copied()
        .unwrap_or(gene);

    let mut replacements = Vec::new();
    let mut added = Vec::new();

    let transcripts = annotation.transcripts(gene);
    let feature_id = match farthest_feature(annotation, &transcripts, strand) {
        Some(tx) => {
            let tx_feature = &features[tx];
            let exons = annotation.exons(tx);
            let terminal = farthest_feature(annotation, &exons, strand);

            let mut widened = gene_feature.detached();
            move_three_prime(&mut widened, strand, boundary);
            widened.attributes.set(PROVENANCE_ATTRIBUTE, tag);
            replacements.push((gene, widened));

            match config.extension_mode {
                ExtensionMode::NewTranscript => {
                    let new_id = format!("{}{}", tx_feature.id(), tag);
                    let mut new_tx = tagged(tx_feature, tag);
                    new_tx.set_id(format, new_id.as_str());
                    move_three_prime(&mut new_tx, strand, boundary);
                    added.push(new_tx);

                    for exon in exons {
                        let mut copy = tagged(&features[exon], tag);
                        copy.set_parent(format, new_id.as_str());
                        if copy.has_id() {
                            let exon_id = format!("{}{}", copy.id(), tag);
                            copy.set_id(format, exon_id);
                        }
                        if Some(exon) == terminal {
                            move_three_prime(&mut copy, strand, boundary);
                        }
                        added.push(copy);
                    }
                    new_id
                }
                ExtensionMode::NewExon => {
                    let mut rewritten = tagged(tx_feature, tag);
                    move_three_prime(&mut rewritten, strand, boundary);
                    replacements.push((tx, rewritten));

                    if let Some(exon) = terminal {
                        let exon_feature = &features[exon];
                        let mut rewritten = tagged(exon_feature, tag);
                        move_three_prime(&mut rewritten, strand, boundary);

                        let others: Vec<&str> = exon_feature
                            .parent_ids(format)
                            .into_iter()
                            .filter(|&parent| parent != tx_feature.id())
                            .collect();
                        if others.is_empty() {
                            replacements.push((exon, rewritten));
                        } else {
                            // shared exon: the other transcripts keep it as it was
                            let mut kept = exon_feature.detached();
                            kept.set_parents(format, &others);
                            replacements.push((exon, kept));

                            rewritten.set_parent(format, tx_feature.id());
                            if rewritten.has_id() {
                                let exon_id = format!("{}{}", rewritten.id(), tag);
                                rewritten.set_id(format, exon_id);
                            }
                            added.push(rewritten);
                        }
                    }
                    tx_feature.id().to_string()
                }
            }
        }
        // children of some other kind keep pointing at the gene id
        None if !annotation.children(gene).is_empty() => {
            let mut widened = tagged(gene_feature, tag);
            move_three_prime(&mut widened, strand, boundary);
            replacements.push((gene, widened));
            gene_feature.id().to_string()
        }
        // the original stays, the extended copy follows it
        None => {
            let new_id = format!("{}{}", gene_feature.id(), tag);
            let mut copy = tagged(gene_feature, tag);
            copy.set_id(format, new_id.as_str());
            move_three_prime(&mut copy, strand, boundary);
            added.push(copy);
            new_id
        }
    };

    log::debug!(
        "{}: {} -> {} via {}",
        gene_feature.id(),
        old_boundary,
        boundary,
        peak.region.id
    );

    Ok(Some(GeneEdit {
        gene,
        anchor,
        replacements,
        added,
        summary: ExtendedGene {
            gene_id: gene_feature.id().to_string(),
            peak_id: peak.region.id.clone(),
            old_boundary,
            new_boundary: boundary,
            feature_id,
        },
    }))
}

fn extend_chrom(
    annotation: &Annotation,
    genes: &[usize],
    peaks: Option<&ChromPeaks>,
    config: &ExtendConfig,
) -> ChromOutcome {
    let mut outcome = ChromOutcome::default();
    for &gene in genes {
        match extend_gene(annotation, gene, peaks, config) {
            Ok(Some(edit)) => outcome.edits.push(edit),
            Ok(None) => {}
            Err(diagnostic) => outcome.diagnostics.push(diagnostic),
        }
    }
    outcome
}

///
/// Extend every gene of `annotation` into its farthest downstream peak.
///
/// Chromosomes are processed in parallel on the current rayon pool. The
/// result holds the whole annotation again: untouched records as they were,
/// modified records in place and new records right after the last record of
/// their gene.
///
/// # Arguments
/// - annotation: genes with their transcripts and exons
/// - peaks: candidate peaks, unstranded ones are ignored
/// - config: `max_dist`, `extension_mode` and `tag` are used here
///
/// # Errors
/// - `InvalidParameter` for a zero `max_dist` or an unusable tag. Problems
///   with single genes are reported as diagnostics instead.
///
pub fn extend_genes(
    annotation: &Annotation,
    peaks: &[Peak],
    config: &ExtendConfig,
) -> Result<Reported<Extension>, GeneextError> {
    config.validate()?;

    let peak_index = index_peaks(peaks);

    // genes per chromosome, chromosomes in order of first appearance
    let mut chroms: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for (idx, gene) in annotation.genes() {
        let chr = gene.region.chr.as_str();
        let slot = *slots.entry(chr).or_insert_with(|| {
            chroms.push((chr, Vec::new()));
            chroms.len() - 1
        });
        chroms[slot].1.push(idx);
    }

    let outcomes: Vec<ChromOutcome> = chroms
        .par_iter()
        .map(|(chr, genes)| extend_chrom(annotation, genes, peak_index.get(*chr), config))
        .collect();

    let mut diagnostics = Vec::new();
    let mut edits = Vec::new();
    for outcome in outcomes {
        diagnostics.extend(outcome.diagnostics);
        edits.extend(outcome.edits);
    }
    edits.sort_by_key(|edit| edit.gene);

    let mut replacements: HashMap<usize, GeneFeature> = HashMap::new();
    let mut insertions: HashMap<usize, Vec<GeneFeature>> = HashMap::new();
    let mut extended = Vec::with_capacity(edits.len());
    let mut added_count = 0;
    for edit in edits {
        replacements.extend(edit.replacements);
        added_count += edit.added.len();
        insertions.entry(edit.anchor).or_default().extend(edit.added);
        extended.push(edit.summary);
    }

    let mut features = Vec::with_capacity(annotation.len() + added_count);
    for (idx, feature) in annotation.features().iter().enumerate() {
        match replacements.remove(&idx) {
            Some(replacement) => features.push(replacement),
            None => features.push(feature.clone()),
        }
        if let Some(added) = insertions.remove(&idx) {
            features.extend(added);
        }
    }

    log::debug!(
        "{} genes extended, {} records added",
        extended.len(),
        added_count
    );

    Ok(Reported::with_diagnostics(
        Extension {
            annotation: Annotation::from_features(annotation.format, features),
            extended,
        },
        diagnostics,
    ))
}

/// Wrap bare gene regions into a BED annotation.
pub fn annotation_from_regions(regions: Vec<Region>) -> Annotation {
    let features = regions
        .into_iter()
        .map(|region| GeneFeature::new(region, "gene", "."))
        .collect();
    Annotation::from_features(AnnotationFormat::Bed, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    use geneext_core::errors::Severity;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn peak(start: u64, end: u64, strand: Strand, id: &str) -> Peak {
        Peak::new(Region::new("chr1", start, end, strand, id), 1.0)
    }

    fn config(max_dist: u64, extension_mode: ExtensionMode) -> ExtendConfig {
        ExtendConfig {
            max_dist,
            extension_mode,
            ..Default::default()
        }
    }

    fn g1() -> Annotation {
        annotation_from_regions(vec![Region::new("chr1", 100, 1000, Strand::Plus, "G1")])
    }

    fn gff(label: &str, id: &str, parent: Option<&str>, start: u64, end: u64) -> GeneFeature {
        let mut feature = GeneFeature::new(
            Region::new("chr1", start, end, Strand::Plus, ""),
            label,
            "test",
        );
        feature.set_id(AnnotationFormat::Gff, id);
        if let Some(parent) = parent {
            feature.set_parent(AnnotationFormat::Gff, parent);
        }
        feature
    }

    #[fixture]
    fn structured() -> Annotation {
        Annotation::from_features(
            AnnotationFormat::Gff,
            vec![
                gff("gene", "G1", None, 100, 1000),
                gff("mRNA", "T1", Some("G1"), 100, 1000),
                gff("exon", "T1.e1", Some("T1"), 100, 300),
                gff("exon", "T1.e2", Some("T1"), 800, 1000),
                gff("mRNA", "T2", Some("G1"), 100, 900),
                gff("exon", "T2.e1", Some("T2"), 100, 300),
                gff("exon", "T2.e2", Some("T2"), 700, 900),
                gff("gene", "G9", None, 5000, 6000),
            ],
        )
    }

    /// End of the extended copy of a lone gene, written right after it.
    fn single_end(extension: &Extension) -> u64 {
        extension.annotation.features()[1].region.end
    }

    #[rstest]
    fn test_extends_to_peak_end() {
        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let result = extend_genes(&g1(), &peaks, &config(500, ExtensionMode::NewTranscript))
            .unwrap()
            .value;

        assert_eq!(single_end(&result), 1300);
        let ids: Vec<&str> = result.annotation.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["G1", "G1GE"]);
        // the gene as read is still there
        assert_eq!(result.annotation.features()[0], g1().features()[0]);
        assert_eq!(result.annotation.features()[1].source, "GE");
        assert_eq!(
            result.extended,
            vec![ExtendedGene {
                gene_id: "G1".to_string(),
                peak_id: "p1".to_string(),
                old_boundary: 1000,
                new_boundary: 1300,
                feature_id: "G1GE".to_string(),
            }]
        );
        assert_eq!(result.extended[0].added_length(), 300);
    }

    #[rstest]
    #[case::beyond_max_dist(peak(1600, 1700, Strand::Plus, "far"))]
    #[case::opposite_strand(peak(1200, 1300, Strand::Minus, "minus"))]
    #[case::unstranded(peak(1200, 1300, Strand::Unknown, "dot"))]
    #[case::upstream(peak(0, 50, Strand::Plus, "up"))]
    #[case::overlapping(peak(900, 1200, Strand::Plus, "inside"))]
    fn test_unusable_peak_leaves_gene(#[case] candidate: Peak) {
        let annotation = g1();
        let config = config(500, ExtensionMode::NewTranscript);
        let result = extend_genes(&annotation, &[candidate], &config).unwrap();

        assert!(result.diagnostics.is_empty());
        assert!(result.value.extended.is_empty());
        assert_eq!(result.value.annotation.features(), annotation.features());
    }

    #[rstest]
    fn test_farthest_peak_wins() {
        let peaks = vec![
            peak(1250, 1450, Strand::Plus, "far"),
            peak(1200, 1300, Strand::Plus, "near"),
        ];
        let result = extend_genes(&g1(), &peaks, &config(500, ExtensionMode::NewTranscript))
            .unwrap()
            .value;
        assert_eq!(single_end(&result), 1450);
        assert_eq!(result.extended[0].peak_id, "far");
    }

    #[rstest]
    fn test_equal_ends_prefer_longer_peak() {
        let peaks = vec![
            peak(1300, 1400, Strand::Plus, "short"),
            peak(1100, 1400, Strand::Plus, "long"),
        ];
        let result = extend_genes(&g1(), &peaks, &config(500, ExtensionMode::NewTranscript))
            .unwrap()
            .value;
        assert_eq!(result.extended[0].peak_id, "long");
    }

    #[rstest]
    #[case(300, 1260)]
    #[case(150, 1100)]
    fn test_max_dist_decides_reach(#[case] max_dist: u64, #[case] expected: u64) {
        let peaks = vec![
            peak(1050, 1100, Strand::Plus, "P1"),
            peak(1200, 1260, Strand::Plus, "P2"),
        ];
        let config = config(max_dist, ExtensionMode::NewTranscript);
        let result = extend_genes(&g1(), &peaks, &config).unwrap().value;
        assert_eq!(single_end(&result), expected);
    }

    #[rstest]
    fn test_extension_is_clipped_to_max_dist() {
        let peaks = vec![peak(1400, 1800, Strand::Plus, "long")];
        let result = extend_genes(&g1(), &peaks, &config(500, ExtensionMode::NewTranscript))
            .unwrap()
            .value;
        assert_eq!(single_end(&result), 1500);
    }

    #[rstest]
    #[case(500, 1700)]
    #[case(200, 1800)]
    fn test_minus_strand_grows_towards_lower_coordinates(
        #[case] max_dist: u64,
        #[case] expected: u64,
    ) {
        let annotation =
            annotation_from_regions(vec![Region::new("chr1", 2000, 3000, Strand::Minus, "G2")]);
        let peaks = vec![
            peak(1700, 1900, Strand::Minus, "p4"),
            peak(3100, 3200, Strand::Minus, "upstream"),
        ];
        let config = config(max_dist, ExtensionMode::NewTranscript);
        let result = extend_genes(&annotation, &peaks, &config).unwrap().value;

        let original = &result.annotation.features()[0];
        assert_eq!((original.region.start, original.region.end), (2000, 3000));
        let copy = &result.annotation.features()[1];
        assert_eq!((copy.region.start, copy.region.end), (expected, 3000));
        assert_eq!(result.extended[0].old_boundary, 2000);
    }

    #[rstest]
    fn test_new_transcript_mode(structured: Annotation) {
        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let config = config(500, ExtensionMode::NewTranscript);
        let result = extend_genes(&structured, &peaks, &config).unwrap().value;
        let out = &result.annotation;

        assert_eq!(out.len(), structured.len() + 3);
        let ids: Vec<&str> = out.iter().map(|f| f.id()).collect();
        assert_eq!(
            ids,
            vec![
                "G1", "T1", "T1.e1", "T1.e2", "T2", "T2.e1", "T2.e2", "T1GE", "T1.e1GE",
                "T1.e2GE", "G9"
            ]
        );

        // originals untouched, gene widened
        assert_eq!(out.features()[1], structured.features()[1]);
        assert_eq!(out.features()[0].region.end, 1300);
        assert_eq!(out.features()[0].attributes.get(PROVENANCE_ATTRIBUTE), Some("GE"));

        let new_tx = out.find("T1GE", None).unwrap();
        assert_eq!(out.parent(new_tx), Some(0));
        assert_eq!(out.features()[new_tx].region.end, 1300);
        assert_eq!(out.features()[new_tx].source, "GE");

        let exons = out.exons(new_tx);
        assert_eq!(exons.len(), 2);
        assert_eq!(out.features()[exons[0]].region.end, 300);
        let terminal = &out.features()[exons[1]].region;
        assert_eq!((terminal.start, terminal.end), (800, 1300));
        assert_eq!(out.features()[exons[1]].attributes.get("Parent"), Some("T1GE"));

        assert!(out.check_nesting(0).is_ok());
        assert_eq!(result.extended[0].feature_id, "T1GE");
    }

    #[rstest]
    fn test_new_exon_mode(structured: Annotation) {
        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let result = extend_genes(&structured, &peaks, &config(500, ExtensionMode::NewExon))
            .unwrap()
            .value;
        let out = &result.annotation;

        assert_eq!(out.len(), structured.len());
        assert_eq!(out.features()[1].id(), "T1");
        assert_eq!(out.features()[1].region.end, 1300);
        assert_eq!(out.features()[1].source, "GE");
        assert_eq!(
            (out.features()[3].region.start, out.features()[3].region.end),
            (800, 1300)
        );
        // the first exon and the other transcript stay as read
        assert_eq!(out.features()[2], structured.features()[2]);
        assert_eq!(out.features()[4], structured.features()[4]);
        assert!(out.check_nesting(0).is_ok());
        assert_eq!(result.extended[0].feature_id, "T1");
    }

    #[rstest]
    fn test_new_exon_splits_shared_exon() {
        let mut e1 = gff("exon", "e1", None, 100, 300);
        e1.set_parents(AnnotationFormat::Gff, &["T1", "T2"]);
        let mut e2 = gff("exon", "e2", None, 800, 1000);
        e2.set_parents(AnnotationFormat::Gff, &["T1", "T2"]);
        let shared = Annotation::from_features(
            AnnotationFormat::Gff,
            vec![
                gff("gene", "G1", None, 100, 1000),
                gff("mRNA", "T1", Some("G1"), 100, 1000),
                gff("mRNA", "T2", Some("G1"), 100, 1000),
                e1,
                e2,
            ],
        );

        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let result = extend_genes(&shared, &peaks, &config(500, ExtensionMode::NewExon))
            .unwrap()
            .value;
        let out = &result.annotation;

        let ids: Vec<&str> = out.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["G1", "T1", "T2", "e1", "e2", "e2GE"]);

        // T2 keeps the exon as read
        let t2 = out.find("T2", None).unwrap();
        assert_eq!(out.features()[t2], shared.features()[2]);
        let kept = &out.features()[4];
        assert_eq!((kept.region.start, kept.region.end), (800, 1000));
        assert_eq!(kept.attributes.get("Parent"), Some("T2"));
        assert_eq!(out.parent(4), Some(t2));

        // T1 gets the extended copy
        let copy = &out.features()[5];
        assert_eq!((copy.region.start, copy.region.end), (800, 1300));
        assert_eq!(copy.attributes.get("Parent"), Some("T1"));
        assert_eq!(out.parent(5), out.find("T1", None));
        assert_eq!(out.features()[1].region.end, 1300);

        assert!(out.check_nesting(0).is_ok());
    }

    #[rstest]
    fn test_broken_nesting_is_reported(structured: Annotation) {
        let mut features = structured.into_features();
        // T1 now sticks out of G1
        features[1].set_bounds(100, 1100);
        let broken = Annotation::from_features(AnnotationFormat::Gff, features);

        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let config = config(500, ExtensionMode::NewTranscript);
        let result = extend_genes(&broken, &peaks, &config).unwrap();

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
        assert!(matches!(
            result.diagnostics[0].error,
            GeneextError::MalformedAnnotation { .. }
        ));
        assert!(result.value.extended.is_empty());
        assert_eq!(result.value.annotation.features(), broken.features());
    }

    #[rstest]
    fn test_unstranded_gene_is_warned_about() {
        let annotation = annotation_from_regions(vec![
            Region::new("chr1", 100, 1000, Strand::Unknown, "G0"),
            Region::new("chr1", 100, 1000, Strand::Plus, "G1"),
        ]);
        let peaks = vec![peak(1200, 1300, Strand::Plus, "p1")];
        let config = config(500, ExtensionMode::NewTranscript);
        let result = extend_genes(&annotation, &peaks, &config).unwrap();

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert_eq!(result.value.annotation.features()[0], annotation.features()[0]);
        assert_eq!(result.value.extended.len(), 1);
    }

    #[rstest]
    fn test_chromosomes_keep_file_order() {
        let regions: Vec<Region> = (0..40)
            .map(|i| {
                let chr = format!("chr{}", i % 7);
                Region::new(chr, 1000 * i, 1000 * i + 500, Strand::Plus, format!("G{}", i))
            })
            .collect();
        let peaks: Vec<Peak> = regions
            .iter()
            .map(|r| {
                let id = format!("p{}", r.id);
                Peak::new(Region::new(r.chr.clone(), r.end + 10, r.end + 60, Strand::Plus, id), 1.0)
            })
            .collect();
        let annotation = annotation_from_regions(regions);

        let result = extend_genes(&annotation, &peaks, &config(100, ExtensionMode::NewTranscript))
            .unwrap()
            .value;

        let ids: Vec<String> = result.annotation.iter().map(|f| f.id().to_string()).collect();
        let expected: Vec<String> = (0..40)
            .flat_map(|i| [format!("G{}", i), format!("G{}GE", i)])
            .collect();
        assert_eq!(ids, expected);
        let summary: Vec<&str> = result.extended.iter().map(|e| e.gene_id.as_str()).collect();
        assert_eq!(summary.len(), 40);
        assert_eq!(summary[0], "G0");
        assert_eq!(summary[39], "G39");
    }

    #[rstest]
    #[case(ExtendConfig { max_dist: 0, ..Default::default() })]
    #[case(ExtendConfig { tag: String::new(), ..Default::default() })]
    fn test_bad_parameters_abort(#[case] config: ExtendConfig) {
        let result = extend_genes(&g1(), &[], &config);
        assert!(matches!(result, Err(GeneextError::InvalidParameter(_))));
    }
}
