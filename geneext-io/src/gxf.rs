//! GTF / GFF3 / BED annotation reading and writing.
//!
//! Records become [`GeneFeature`]s with 0-based half-open coordinates; the
//! file convention is given explicitly as a [`CoordinateSystem`]. Every
//! record remembers the line it was read from, and writers re-emit that line
//! untouched when the record was not modified, so a read/write cycle without
//! changes reproduces the records byte for byte.
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use geneext_core::models::feature::id_key;
use geneext_core::models::{
    Annotation, AnnotationFormat, Attributes, CoordinateSystem, GeneFeature, Origin, Region,
    Strand,
};
use geneext_core::utils::{get_dynamic_reader, get_dynamic_writer};
use geneext_core::{Diagnostic, GeneextError, Reported};

use crate::error::{GxfIoError, Result};

pub const GFF3_HEADER: &str = "##gff-version 3";

/// Split GTF column 9 on `;`, ignoring semicolons inside quotes.
fn split_gtf_attributes(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut last = 0;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&text[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[last..]);
    parts
}

///
/// Parse an attribute column.
///
/// GTF: `gene_id "G1"; transcript_id "T1";` (quotes optional for values).
/// GFF3: `ID=T1;Parent=G1`. Order and repeated keys are kept.
///
pub fn parse_attributes(text: &str, format: AnnotationFormat) -> Attributes {
    let text = text.trim();
    if text.is_empty() || text == "." {
        return Attributes::new();
    }

    match format {
        AnnotationFormat::Gtf => split_gtf_attributes(text)
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|part| match part.split_once(char::is_whitespace) {
                Some((key, value)) => {
                    let value = value.trim();
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value);
                    (key.to_string(), value.to_string())
                }
                None => (part.to_string(), String::new()),
            })
            .collect(),
        AnnotationFormat::Gff | AnnotationFormat::Bed => text
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (part.to_string(), String::new()),
            })
            .collect(),
    }
}

/// Render attributes back into column 9 of `format`.
pub fn render_attributes(attributes: &Attributes, format: AnnotationFormat) -> String {
    if attributes.is_empty() {
        return ".".to_string();
    }
    match format {
        AnnotationFormat::Gtf => attributes
            .iter()
            .map(|(k, v)| format!("{} \"{}\";", k, v))
            .collect::<Vec<_>>()
            .join(" "),
        AnnotationFormat::Gff | AnnotationFormat::Bed => attributes
            .iter()
            .map(|(k, v)| match v.is_empty() {
                true => k.to_string(),
                false => format!("{}={}", k, v),
            })
            .collect::<Vec<_>>()
            .join(";"),
    }
}

fn parse_coordinate(line: &str, value: &str, name: &str) -> std::result::Result<u64, GeneextError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| GeneextError::format(line, format!("{} is not a non-negative integer", name)))
}

fn parse_gxf_line(
    line: &str,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> std::result::Result<GeneFeature, GeneextError> {
    let fields: Vec<&str> = line.splitn(9, '\t').collect();
    if fields.len() < 8 {
        return Err(GeneextError::format(
            line,
            format!("expected 9 tab separated columns, found {}", fields.len()),
        ));
    }

    let start = parse_coordinate(line, fields[3], "start")?;
    let end = parse_coordinate(line, fields[4], "end")?;
    if start > end {
        return Err(GeneextError::format(line, "start is greater than end"));
    }
    let start = coords
        .start_to_internal(start)
        .ok_or_else(|| GeneextError::format(line, "start is 0 in a 1-based file"))?;

    let strand = Strand::from_str(fields[6].trim())?;
    let attributes = parse_attributes(fields.get(8).copied().unwrap_or(""), format);

    let mut feature = GeneFeature::new(
        Region::new(fields[0], start, end, strand, ""),
        fields[2],
        fields[1],
    );
    feature.region.score = fields[5].trim().parse::<f64>().ok();
    feature.phase = fields[7].trim().to_string();

    if let Some(key) = id_key(format, feature.feature_type) {
        if let Some(id) = attributes.get(key) {
            feature.region.id = id.to_string();
        }
    }
    feature.attributes = attributes;
    feature.parent_id = feature
        .parent_ids(format)
        .first()
        .map(|p| p.to_string());

    Ok(feature)
}

fn parse_bed_feature(
    line: &str,
    coords: CoordinateSystem,
) -> std::result::Result<GeneFeature, GeneextError> {
    let mut region = Region::from_bed_line(line)?;
    region.start = coords
        .start_to_internal(region.start)
        .ok_or_else(|| GeneextError::format(line, "start is 0 in a 1-based file"))?;

    Ok(GeneFeature::new(region, "gene", "."))
}

///
/// Parse a single annotation line.
///
/// BED lines become childless gene records.
///
pub fn parse_feature_line(
    line: &str,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> std::result::Result<GeneFeature, GeneextError> {
    let mut feature = match format {
        AnnotationFormat::Bed => parse_bed_feature(line, coords)?,
        AnnotationFormat::Gtf | AnnotationFormat::Gff => parse_gxf_line(line, format, coords)?,
    };
    feature.origin = Some(Origin {
        line: line.to_string(),
        format,
        coords,
    });
    Ok(feature)
}

///
/// Render one feature as a line of `format`.
///
/// A record that still carries the line it was read from, in the same format
/// and coordinate system, is written back verbatim.
///
pub fn format_feature(
    feature: &GeneFeature,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> String {
    if let Some(origin) = &feature.origin {
        if origin.format == format && origin.coords == coords {
            return origin.line.clone();
        }
    }

    let region = &feature.region;
    let start = coords.start_from_internal(region.start);

    match format {
        AnnotationFormat::Bed => Region {
            start,
            ..region.clone()
        }
        .as_string(),
        AnnotationFormat::Gtf | AnnotationFormat::Gff => format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            region.chr,
            feature.source,
            feature.type_label,
            start,
            region.end,
            region.score.map_or(".".to_string(), |s| s.to_string()),
            region.strand,
            feature.phase,
            render_attributes(&feature.attributes, format),
        ),
    }
}

fn is_comment(line: &str, format: AnnotationFormat) -> bool {
    match format {
        AnnotationFormat::Bed => {
            line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
        }
        AnnotationFormat::Gtf | AnnotationFormat::Gff => line.starts_with('#'),
    }
}

///
/// Read an annotation from any buffered source.
///
/// Malformed lines are reported as diagnostics and skipped. For GFF3 reading
/// stops at a `##FASTA` section.
///
pub fn read_annotation_from<R: BufRead>(
    reader: R,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> Result<Reported<Annotation>> {
    let mut features = Vec::new();
    let mut diagnostics = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if format == AnnotationFormat::Gff && line.starts_with("##FASTA") {
            break;
        }
        if line.trim().is_empty() || is_comment(&line, format) {
            continue;
        }

        match parse_feature_line(&line, format, coords) {
            Ok(feature) => features.push(feature),
            Err(e) => diagnostics.push(Diagnostic::error(e)),
        }
    }

    Ok(Reported::with_diagnostics(
        Annotation::from_features(format, features),
        diagnostics,
    ))
}

///
/// Read an annotation file (optionally gzipped).
///
/// # Arguments
/// - path: GTF, GFF3 or BED file
/// - format: how to parse it, see [`AnnotationFormat::from_path`]
/// - coords: convention of the start/end columns
///
pub fn read_annotation(
    path: &Path,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> Result<Reported<Annotation>> {
    let reader = get_dynamic_reader(path).map_err(|e| GxfIoError::Open {
        path: path.display().to_string(),
        reason: format!("{:#}", e),
    })?;
    read_annotation_from(reader, format, coords)
}

///
/// Can an annotation read as `input` be written as `output`?
///
/// Each format writes to itself; anything can be flattened to BED (genes
/// only). GTF and GFF3 name their hierarchy differently and are not
/// converted into each other.
///
pub fn check_output_format(
    input: AnnotationFormat,
    output: AnnotationFormat,
) -> std::result::Result<(), GeneextError> {
    if input == output || output == AnnotationFormat::Bed {
        return Ok(());
    }
    Err(GeneextError::UnsupportedFormat(format!(
        "can't write {} records as {}",
        input, output
    )))
}

///
/// Write an annotation to any sink.
///
pub fn write_annotation_to<W: Write>(
    mut writer: W,
    annotation: &Annotation,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> Result<()> {
    check_output_format(annotation.format, format)?;

    if format == AnnotationFormat::Gff {
        writeln!(writer, "{}", GFF3_HEADER)?;
    }

    let flatten = format == AnnotationFormat::Bed && annotation.format.is_structured();
    for feature in annotation.iter() {
        if flatten && !feature.is_gene() {
            continue;
        }
        writeln!(writer, "{}", format_feature(feature, format, coords))?;
    }

    writer.flush()?;
    Ok(())
}

///
/// Write an annotation to disk, gzipped when the path ends in `.gz`.
///
pub fn write_annotation(
    path: &Path,
    annotation: &Annotation,
    format: AnnotationFormat,
    coords: CoordinateSystem,
) -> Result<()> {
    check_output_format(annotation.format, format)?;
    let mut writer = get_dynamic_writer(path).map_err(|e| GxfIoError::Open {
        path: path.display().to_string(),
        reason: format!("{:#}", e),
    })?;
    write_annotation_to(&mut writer, annotation, format, coords)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use geneext_core::models::FeatureType;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/geneext")
            .join(file_name)
    }

    #[rstest]
    fn test_parse_gtf_attributes() {
        let attrs = parse_attributes(
            r#"gene_id "G1"; transcript_id "T1"; note "a;b"; exon_number 2;"#,
            AnnotationFormat::Gtf,
        );
        assert_eq!(attrs.get("gene_id"), Some("G1"));
        assert_eq!(attrs.get("note"), Some("a;b"));
        assert_eq!(attrs.get("exon_number"), Some("2"));
        assert_eq!(attrs.len(), 4);
    }

    #[rstest]
    fn test_parse_gff_attributes() {
        let attrs = parse_attributes("ID=T1;Parent=G1;Name=foo", AnnotationFormat::Gff);
        assert_eq!(attrs.get("Parent"), Some("G1"));
        assert_eq!(
            render_attributes(&attrs, AnnotationFormat::Gff),
            "ID=T1;Parent=G1;Name=foo"
        );
    }

    #[rstest]
    fn test_parse_gtf_line_converts_coordinates() {
        let line = concat!(
            "chr1\thavana\ttranscript\t101\t1000\t.\t+\t.\t",
            "gene_id \"G1\"; transcript_id \"T1\";"
        );
        let feature =
            parse_feature_line(line, AnnotationFormat::Gtf, CoordinateSystem::OneBasedClosed)
                .unwrap();

        assert_eq!(feature.feature_type, FeatureType::Transcript);
        assert_eq!(feature.region.start, 100);
        assert_eq!(feature.region.end, 1000);
        assert_eq!(feature.id(), "T1");
        assert_eq!(feature.parent_id.as_deref(), Some("G1"));
        assert_eq!(feature.source, "havana");
    }

    #[rstest]
    fn test_gff_first_parent_wins() {
        let line = "chr1\tmaker\texon\t1\t10\t.\t-\t.\tParent=T1,T2";
        let feature =
            parse_feature_line(line, AnnotationFormat::Gff, CoordinateSystem::OneBasedClosed)
                .unwrap();
        assert_eq!(feature.parent_id.as_deref(), Some("T1"));
        assert_eq!(feature.region.strand, Strand::Minus);
    }

    #[rstest]
    #[case("chr1\tsrc\tgene\t100\t50\t.\t+\t.\tID=G1")]
    #[case("chr1\tsrc\tgene\t0\t50\t.\t+\t.\tID=G1")]
    #[case("chr1\tsrc\tgene\tx\t50\t.\t+\t.\tID=G1")]
    #[case("chr1\tsrc\tgene\t10\t50\t.\tW\t.\tID=G1")]
    #[case("chr1\tsrc\tgene\t10")]
    fn test_bad_lines(#[case] line: &str) {
        assert!(matches!(
            parse_feature_line(line, AnnotationFormat::Gff, CoordinateSystem::OneBasedClosed),
            Err(GeneextError::Format { .. })
        ));
    }

    #[rstest]
    fn test_modified_record_is_rendered() {
        let line = "chr1\thavana\texon\t801\t1000\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";";
        let mut exon =
            parse_feature_line(line, AnnotationFormat::Gtf, CoordinateSystem::OneBasedClosed)
                .unwrap();
        assert_eq!(
            format_feature(&exon, AnnotationFormat::Gtf, CoordinateSystem::OneBasedClosed),
            line
        );

        exon.set_bounds(800, 1300);
        exon.source = "GE".to_string();
        assert_eq!(
            format_feature(&exon, AnnotationFormat::Gtf, CoordinateSystem::OneBasedClosed),
            "chr1\tGE\texon\t801\t1300\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";"
        );
    }

    #[rstest]
    fn test_read_gtf_fixture() {
        let reported = read_annotation(
            &get_test_path("genes.gtf"),
            AnnotationFormat::Gtf,
            CoordinateSystem::OneBasedClosed,
        )
        .unwrap();
        assert!(reported.diagnostics.is_empty());

        let annotation = reported.value;
        let genes: Vec<&str> = annotation.genes().map(|(_, g)| g.id()).collect();
        assert_eq!(genes, vec!["G1", "G2", "G3"]);

        let g1 = annotation.find("G1", Some(FeatureType::Gene)).unwrap();
        assert_eq!(annotation.transcripts(g1).len(), 2);
        assert!(annotation.check_nesting(g1).is_ok());
    }

    #[rstest]
    #[case("genes.gtf", AnnotationFormat::Gtf)]
    #[case("genes.gff3", AnnotationFormat::Gff)]
    #[case("genes.bed", AnnotationFormat::Bed)]
    fn test_round_trip_is_byte_identical(#[case] name: &str, #[case] format: AnnotationFormat) {
        let path = get_test_path(name);
        let coords = format.default_coordinates();
        let annotation = read_annotation(&path, format, coords).unwrap().value;

        let mut out = Vec::new();
        write_annotation_to(&mut out, &annotation, format, coords).unwrap();

        let original = std::fs::read_to_string(&path).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), original);
    }

    #[rstest]
    fn test_flatten_to_bed() {
        let annotation = read_annotation(
            &get_test_path("genes.gtf"),
            AnnotationFormat::Gtf,
            CoordinateSystem::OneBasedClosed,
        )
        .unwrap()
        .value;

        let mut out = Vec::new();
        write_annotation_to(
            &mut out,
            &annotation,
            AnnotationFormat::Bed,
            CoordinateSystem::ZeroBasedHalfOpen,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.lines().next(), Some("chr1\t100\t1000\tG1\t.\t+"));
    }

    #[rstest]
    fn test_gtf_to_gff_is_refused() {
        let annotation = Annotation::new(AnnotationFormat::Gtf);
        let result = write_annotation_to(
            Vec::new(),
            &annotation,
            AnnotationFormat::Gff,
            CoordinateSystem::OneBasedClosed,
        );
        assert!(matches!(
            result,
            Err(GxfIoError::Geneext(GeneextError::UnsupportedFormat(_)))
        ));
    }

    #[rstest]
    fn test_write_gz_and_read_back() {
        let annotation = read_annotation(
            &get_test_path("genes.gff3"),
            AnnotationFormat::Gff,
            CoordinateSystem::OneBasedClosed,
        )
        .unwrap()
        .value;

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("out.gff3.gz");
        write_annotation(
            &path,
            &annotation,
            AnnotationFormat::Gff,
            CoordinateSystem::OneBasedClosed,
        )
        .unwrap();

        let back = read_annotation(&path, AnnotationFormat::Gff, CoordinateSystem::OneBasedClosed)
            .unwrap()
            .value;
        assert_eq!(back.len(), annotation.len());
    }
}
