//! Turn peaks that no gene claims into single-exon genes of their own.
use geneext_core::GeneextError;
use geneext_core::models::{Annotation, AnnotationFormat, GeneFeature, Peak, Region};
use geneext_overlaprs::outersect;

use crate::config::PROVENANCE_ATTRIBUTE;

///
/// Orphan records can only be written next to a structured annotation of the
/// same format.
///
pub fn check_orphan_formats(
    input_format: AnnotationFormat,
    output_format: AnnotationFormat,
) -> Result<(), GeneextError> {
    match (input_format, output_format) {
        (AnnotationFormat::Gtf, AnnotationFormat::Gtf)
        | (AnnotationFormat::Gff, AnnotationFormat::Gff) => Ok(()),
        (input, output) => Err(GeneextError::UnsupportedFormat(format!(
            "orphan peaks can only be added for gtf -> gtf or gff -> gff, not {} -> {}",
            input, output
        ))),
    }
}

fn orphan_records(peak: &Peak, tag: &str, format: AnnotationFormat) -> [GeneFeature; 3] {
    let gene_id = format!("{}{}", peak.region.id, tag);
    let transcript_id = format!("{}.t1", gene_id);
    let region = Region {
        id: String::new(),
        score: None,
        ..peak.region.clone()
    };
    let transcript_label = match format {
        AnnotationFormat::Gff => "mRNA",
        _ => "transcript",
    };

    let mut gene = GeneFeature::new(region.clone(), "gene", tag);
    gene.set_id(format, gene_id.as_str());

    // gtf wants gene_id ahead of transcript_id
    let mut transcript = GeneFeature::new(region.clone(), transcript_label, tag);
    transcript.set_parent(format, gene_id.as_str());
    transcript.set_id(format, transcript_id.as_str());

    let mut exon = GeneFeature::new(region, "exon", tag);
    if format == AnnotationFormat::Gtf {
        exon.attributes.set("gene_id", gene_id.as_str());
    }
    exon.set_parent(format, transcript_id.as_str());
    if format == AnnotationFormat::Gff {
        exon.set_id(format, format!("{}.exon1", transcript_id));
    }

    let mut records = [gene, transcript, exon];
    for record in records.iter_mut() {
        record.attributes.set(PROVENANCE_ATTRIBUTE, tag);
    }
    records
}

///
/// Build gene records for every peak that overlaps none of the genes of the
/// extended annotation, whatever their strand.
///
/// Each such peak becomes a gene `<peak-id><tag>` with one transcript
/// `<peak-id><tag>.t1` and one exon covering the whole peak.
///
/// # Errors
/// - `UnsupportedFormat` unless the run is gtf -> gtf or gff -> gff
/// - `InvalidParameter` for an empty tag
///
pub fn assign_orphans(
    peaks: &[Peak],
    extended: &Annotation,
    tag: &str,
    input_format: AnnotationFormat,
    output_format: AnnotationFormat,
) -> Result<Vec<GeneFeature>, GeneextError> {
    check_orphan_formats(input_format, output_format)?;
    if tag.is_empty() {
        return Err(GeneextError::InvalidParameter(
            "tag must not be empty".to_string(),
        ));
    }

    let genes: Vec<&Region> = extended.genes().map(|(_, gene)| &gene.region).collect();
    let candidates: Vec<&Peak> = peaks.iter().collect();
    let orphans = outersect(candidates, &genes, false);
    log::debug!("{} of {} peaks are orphans", orphans.len(), peaks.len());

    Ok(orphans
        .into_iter()
        .flat_map(|peak| orphan_records(peak, tag, output_format))
        .collect())
}
