use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use geneext_core::models::{Peak, Region, RegionSet};
use geneext_core::utils::get_dynamic_reader;
use geneext_core::{Diagnostic, GeneextError, Reported};

use crate::error::{GxfIoError, Result};

pub trait BedWrite {
    ///
    /// Write data to disk as bed file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()>;

    ///
    /// Write data to disk as bed.gz file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_bed_gz<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()>;
}

fn create_with_parents(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    File::create(path)
}

fn write_lines<W, I>(mut writer: W, regions: I) -> std::io::Result<W>
where
    W: Write,
    I: Iterator<Item = Region>,
{
    for region in regions {
        writeln!(writer, "{}", region.as_string())?;
    }
    writer.flush()?;
    Ok(writer)
}

fn write_plain<I: Iterator<Item = Region>>(path: &Path, regions: I) -> std::io::Result<()> {
    let file = create_with_parents(path)?;
    write_lines(BufWriter::new(file), regions)?;
    Ok(())
}

fn write_gz<I: Iterator<Item = Region>>(path: &Path, regions: I) -> std::io::Result<()> {
    let file = create_with_parents(path)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
    write_lines(encoder, regions)?.finish()?;
    Ok(())
}

impl BedWrite for RegionSet {
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        write_plain(path.as_ref(), self.regions.iter().cloned())
    }

    fn write_bed_gz<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        write_gz(path.as_ref(), self.regions.iter().cloned())
    }
}

/// Peaks are written as BED6 with their coverage in the score column.
impl BedWrite for [Peak] {
    fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        write_plain(path.as_ref(), self.iter().map(peak_to_region))
    }

    fn write_bed_gz<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        write_gz(path.as_ref(), self.iter().map(peak_to_region))
    }
}

fn peak_to_region(peak: &Peak) -> Region {
    Region {
        score: Some(peak.coverage),
        ..peak.region.clone()
    }
}

fn is_bed_header(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

///
/// Parse peaks from any buffered BED source.
///
/// # Arguments
/// - reader: BED text, BED3 or wider
/// - coverage_column: 1-based column holding the coverage. Without it the
///   score column (5) is used when numeric, otherwise coverage is 0.
///
pub fn read_peaks_from<R: BufRead>(
    reader: R,
    coverage_column: Option<usize>,
) -> Result<Reported<Vec<Peak>>> {
    let mut peaks = Vec::new();
    let mut diagnostics = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || is_bed_header(&line) {
            continue;
        }

        let region = match Region::from_bed_line(&line) {
            Ok(region) => region,
            Err(e) => {
                diagnostics.push(Diagnostic::error(e));
                continue;
            }
        };

        let peak = match coverage_column {
            Some(column) => {
                let value = column
                    .checked_sub(1)
                    .and_then(|c| line.split('\t').nth(c))
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite());
                match value {
                    Some(coverage) => Peak::new(region, coverage),
                    None => {
                        diagnostics.push(Diagnostic::error(GeneextError::format(
                            line.as_str(),
                            format!("column {} does not hold a numeric coverage", column),
                        )));
                        continue;
                    }
                }
            }
            None => Peak::from(region),
        };

        peaks.push(peak);
    }

    Ok(Reported::with_diagnostics(peaks, diagnostics))
}

///
/// Read a peak file (BED, optionally gzipped).
///
/// Malformed lines are reported and skipped; a file that can't be opened is
/// an error.
///
pub fn read_peaks(path: &Path, coverage_column: Option<usize>) -> Result<Reported<Vec<Peak>>> {
    let reader = get_dynamic_reader(path).map_err(|e| GxfIoError::Open {
        path: path.display().to_string(),
        reason: format!("{:#}", e),
    })?;
    read_peaks_from(reader, coverage_column)
}

#[cfg(test)]
mod tests {

    use super::*;

    use std::path::PathBuf;

    use geneext_core::models::Strand;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/geneext")
            .join(file_name)
    }

    #[rstest]
    fn test_read_peaks_fixture() {
        let reported = read_peaks(&get_test_path("peaks.bed"), None).unwrap();
        assert!(reported.diagnostics.is_empty());

        let peaks = reported.value;
        assert_eq!(peaks.len(), 6);
        assert_eq!(peaks[0].region.id, "peak_1");
        assert_eq!(peaks[0].region.strand, Strand::Plus);
        assert_eq!(peaks[0].coverage, 12.0);
    }

    #[rstest]
    fn test_read_peaks_coverage_column() {
        let text = "chr1\t10\t20\tp1\t0\t+\t7.5\nchr1\t30\t40\tp2\t0\t-\tNA\nchr1\t50\n";
        let reported = read_peaks_from(text.as_bytes(), Some(7)).unwrap();

        assert_eq!(reported.value.len(), 1);
        assert_eq!(reported.value[0].coverage, 7.5);
        // the NA coverage and the short line
        assert_eq!(reported.diagnostics.len(), 2);
    }

    #[rstest]
    fn test_read_peaks_missing_file() {
        let result = read_peaks(Path::new("/no/such/peaks.bed"), None);
        assert!(matches!(result, Err(GxfIoError::Open { .. })));
    }

    #[rstest]
    #[case("peaks.bed")]
    #[case("peaks.bed.gz")]
    fn test_save_peaks(#[case] name: &str) {
        let peaks = read_peaks(&get_test_path("peaks.bed"), None).unwrap().value;

        let tempdir = tempfile::tempdir().unwrap();
        let new_file_path = tempdir.path().join(name);

        match name.ends_with(".gz") {
            true => peaks.write_bed_gz(&new_file_path).unwrap(),
            false => peaks.write_bed(&new_file_path).unwrap(),
        }

        let back = read_peaks(&new_file_path, None).unwrap().value;
        assert_eq!(back.len(), peaks.len());
        assert_eq!(
            back.iter().map(|p| p.coverage).collect::<Vec<_>>(),
            peaks.iter().map(|p| p.coverage).collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn test_save_region_set() {
        let rs = RegionSet::from(vec![Region::new("chr1", 10, 20, Strand::Minus, "g")]);
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("nested/genes.bed");

        rs.write_bed(&path).unwrap();

        let back = RegionSet::try_from(path.as_path()).unwrap();
        assert_eq!(back.regions, rs.regions);
    }
}
