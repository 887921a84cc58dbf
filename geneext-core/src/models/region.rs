use std::fmt::{self, Display};

use crate::errors::GeneextError;
use crate::models::Strand;

///
/// Region struct, a single stranded genomic interval.
///
/// Coordinates are 0-based half-open (`[start, end)`), whatever convention
/// the file it came from uses.
///
#[derive(PartialEq, Debug, Clone)]
pub struct Region {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub id: String,
    pub score: Option<f64>,
}

impl Region {
    pub fn new<C: Into<String>, S: Into<String>>(
        chr: C,
        start: u64,
        end: u64,
        strand: Strand,
        id: S,
    ) -> Self {
        Region {
            chr: chr.into(),
            start,
            end,
            strand,
            id: id.into(),
            score: None,
        }
    }

    ///
    /// Parse one line of a BED file (BED3 up to BED6, extra columns ignored).
    ///
    /// The name column becomes the id; without one the id falls back to
    /// `chr:start-end`. Score is kept only when numeric.
    ///
    pub fn from_bed_line(line: &str) -> Result<Region, GeneextError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(GeneextError::format(line, "expected at least 3 columns"));
        }

        let chr = fields[0].to_string();
        let start: u64 = fields[1]
            .trim()
            .parse()
            .map_err(|_| GeneextError::format(line, "start is not a non-negative integer"))?;
        let end: u64 = fields[2]
            .trim()
            .parse()
            .map_err(|_| GeneextError::format(line, "end is not a non-negative integer"))?;
        if start > end {
            return Err(GeneextError::format(line, "start is greater than end"));
        }

        let id = match fields.get(3).map(|s| s.trim()) {
            Some(name) if !name.is_empty() && name != "." => name.to_string(),
            _ => format!("{}:{}-{}", chr, start, end),
        };
        let score = fields.get(4).and_then(|s| s.trim().parse::<f64>().ok());
        let strand = fields
            .get(5)
            .and_then(|s| s.trim().chars().next())
            .map(Strand::from_char)
            .unwrap_or_default();

        Ok(Region {
            chr,
            start,
            end,
            strand,
            id,
            score,
        })
    }

    ///
    /// Get length of the region
    ///
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    ///
    /// Do the two regions share at least one base? With `by_strand` they must
    /// also sit on the same strand (unknown only matches unknown).
    ///
    pub fn overlaps(&self, other: &Region, by_strand: bool) -> bool {
        if self.chr != other.chr {
            return false;
        }
        if by_strand && self.strand != other.strand {
            return false;
        }
        self.start < other.end && other.start < self.end
    }

    ///
    /// The 3' boundary: `end` on the plus strand, `start` on the minus strand.
    /// Unstranded regions have no 3' end.
    ///
    pub fn three_prime(&self) -> Option<u64> {
        match self.strand {
            Strand::Plus => Some(self.end),
            Strand::Minus => Some(self.start),
            Strand::Unknown => None,
        }
    }

    /// Does `other` lie completely within this region?
    pub fn contains(&self, other: &Region) -> bool {
        self.chr == other.chr && self.start <= other.start && other.end <= self.end
    }

    ///
    /// Get BED6 line of Region
    ///
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chr,
            self.start,
            self.end,
            if self.id.is_empty() { "." } else { &self.id },
            self.score.map_or(".".to_string(), |s| s.to_string()),
            self.strand,
        )
    }
}

impl AsRef<Region> for Region {
    fn as_ref(&self) -> &Region {
        self
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
