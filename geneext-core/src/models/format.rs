use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::GeneextError;

/// Annotation file families geneext can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationFormat {
    Gtf,
    Gff,
    Bed,
}

impl AnnotationFormat {
    ///
    /// Guess the format from a file name. A trailing `.gz` is looked through,
    /// so `genes.gtf.gz` is GTF.
    ///
    pub fn from_path(path: &Path) -> Result<Self, GeneextError> {
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| {
                GeneextError::UnsupportedFormat(format!("not a file name: {}", path.display()))
            })?;

        let base = filename.strip_suffix(".gz").unwrap_or(filename);
        let ext = PathBuf::from(base)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_string())
            .ok_or_else(|| {
                GeneextError::UnsupportedFormat(format!(
                    "can't guess the format of {} without an extension",
                    path.display()
                ))
            })?;

        ext.parse()
    }

    /// Coordinate convention the format uses on disk.
    pub fn default_coordinates(&self) -> CoordinateSystem {
        match self {
            AnnotationFormat::Gtf | AnnotationFormat::Gff => CoordinateSystem::OneBasedClosed,
            AnnotationFormat::Bed => CoordinateSystem::ZeroBasedHalfOpen,
        }
    }

    /// GTF and GFF carry a feature hierarchy, BED does not.
    pub fn is_structured(&self) -> bool {
        !matches!(self, AnnotationFormat::Bed)
    }
}

impl FromStr for AnnotationFormat {
    type Err = GeneextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gtf" => Ok(AnnotationFormat::Gtf),
            "gff" | "gff3" => Ok(AnnotationFormat::Gff),
            "bed" => Ok(AnnotationFormat::Bed),
            other => Err(GeneextError::UnsupportedFormat(format!(
                "unknown annotation format '{}' (expected gtf, gff or bed)",
                other
            ))),
        }
    }
}

impl Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnnotationFormat::Gtf => "gtf",
            AnnotationFormat::Gff => "gff",
            AnnotationFormat::Bed => "bed",
        };
        write!(f, "{}", s)
    }
}

///
/// How start/end columns are written in a file.
///
/// The engine itself only ever sees 0-based half-open coordinates; this is
/// the knob readers and writers use to translate.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    /// GTF/GFF style: first base is 1, end is inclusive.
    OneBasedClosed,
    /// BED style: first base is 0, end is exclusive.
    ZeroBasedHalfOpen,
}

impl CoordinateSystem {
    /// File start column -> internal start.
    pub fn start_to_internal(&self, start: u64) -> Option<u64> {
        match self {
            CoordinateSystem::OneBasedClosed => start.checked_sub(1),
            CoordinateSystem::ZeroBasedHalfOpen => Some(start),
        }
    }

    /// Internal start -> file start column.
    pub fn start_from_internal(&self, start: u64) -> u64 {
        match self {
            CoordinateSystem::OneBasedClosed => start + 1,
            CoordinateSystem::ZeroBasedHalfOpen => start,
        }
    }
}
