//! Genome-wide interval indexing for strand-aware multi-chromosome overlap queries.
//!
//! [`MultiChromOverlapper`] keeps one [`Bits`] index per sequence. A sequence
//! is a chromosome, or a (chromosome, strand) pair when the index is built
//! strand-aware; in that case a query only ever sees intervals on its own
//! strand.
//!
//! # Examples
//!
//! ```
//! use geneext_overlaprs::multi_chrom_overlapper::IntoMultiChromOverlapper;
//! use geneext_core::models::{Region, Strand};
//!
//! let genes = vec![
//!     Region::new("chr1", 1000, 2000, Strand::Plus, "G1"),
//!     Region::new("chr1", 5000, 6000, Strand::Minus, "G2"),
//!     Region::new("chr2", 1000, 3000, Strand::Plus, "G3"),
//! ];
//!
//! let index = genes.as_slice().into_multi_chrom_overlapper(true);
//!
//! let peak = Region::new("chr1", 5500, 5600, Strand::Plus, "P1");
//! // G2 is on the other strand
//! assert!(!index.overlaps_region(&peak));
//!
//! let unstranded = genes.as_slice().into_multi_chrom_overlapper(false);
//! assert!(unstranded.overlaps_region(&peak));
//! ```

use std::collections::HashMap;
use std::fmt::{self, Display};

use geneext_core::models::{Interval, Region, Strand};
use num_traits::{PrimInt, Unsigned};

use crate::{Bits, Overlapper};

/// Key of one per-sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChromKey {
    pub chr: String,
    /// `None` when the index ignores strand.
    pub strand: Option<Strand>,
}

impl ChromKey {
    pub fn new<C: Into<String>>(chr: C, strand: Option<Strand>) -> Self {
        ChromKey {
            chr: chr.into(),
            strand,
        }
    }
}

impl Display for ChromKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strand {
            Some(strand) => write!(f, "{}({})", self.chr, strand),
            None => write!(f, "{}", self.chr),
        }
    }
}

/// A genome-wide index for overlap queries across multiple chromosomes.
pub struct MultiChromOverlapper<I, T> {
    index_maps: HashMap<ChromKey, Box<dyn Overlapper<I, T>>>,
    by_strand: bool,
}

impl<I, T> MultiChromOverlapper<I, T>
where
    I: PrimInt + Unsigned + Send + Sync + 'static,
    T: Eq + Clone + Send + Sync + 'static,
{
    ///
    /// Build the index from intervals already grouped by sequence.
    ///
    pub fn build(intervals: HashMap<ChromKey, Vec<Interval<I, T>>>, by_strand: bool) -> Self {
        let index_maps = intervals
            .into_iter()
            .map(|(key, chr_intervals)| {
                let lapper: Box<dyn Overlapper<I, T>> = Box::new(Bits::build(chr_intervals));
                (key, lapper)
            })
            .collect();

        MultiChromOverlapper {
            index_maps,
            by_strand,
        }
    }

    /// The key a query on `chr` / `strand` is looked up under.
    pub fn key_for(&self, chr: &str, strand: Strand) -> ChromKey {
        ChromKey::new(chr, self.by_strand.then_some(strand))
    }

    ///
    /// Iterate over all intervals of one sequence overlapping start .. end.
    /// An unknown sequence yields nothing.
    ///
    pub fn find_iter<'a>(
        &'a self,
        key: &ChromKey,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        match self.index_maps.get(key) {
            Some(lapper) => lapper.find_iter(start, end),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn any(&self, key: &ChromKey, start: I, end: I) -> bool {
        self.index_maps
            .get(key)
            .is_some_and(|lapper| lapper.any(start, end))
    }
}

impl<T> MultiChromOverlapper<u64, T>
where
    T: Eq + Clone + Send + Sync + 'static,
{
    /// Does anything in the index overlap `region` (respecting the strand policy)?
    pub fn overlaps_region(&self, region: &Region) -> bool {
        let key = self.key_for(&region.chr, region.strand);
        self.any(&key, region.start, region.end)
    }
}

/// A trait for converting region-based data into a [`MultiChromOverlapper`].
///
/// The payload of every interval is the position of its region in the input,
/// so hits can be mapped back to the original records.
pub trait IntoMultiChromOverlapper<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Consumes the input and builds a [`MultiChromOverlapper`].
    ///
    /// # Arguments
    ///
    /// * `by_strand` - index (chromosome, strand) pairs instead of chromosomes
    fn into_multi_chrom_overlapper(self, by_strand: bool) -> MultiChromOverlapper<I, T>;
}

impl<R: AsRef<Region>> IntoMultiChromOverlapper<u64, usize> for &[R] {
    fn into_multi_chrom_overlapper(self, by_strand: bool) -> MultiChromOverlapper<u64, usize> {
        let mut intervals: HashMap<ChromKey, Vec<Interval<u64, usize>>> = HashMap::default();

        for (idx, region) in self.iter().map(|r| r.as_ref()).enumerate() {
            let key = ChromKey::new(region.chr.as_str(), by_strand.then_some(region.strand));
            intervals.entry(key).or_default().push(Interval {
                start: region.start,
                end: region.end,
                val: idx,
            });
        }

        MultiChromOverlapper::build(intervals, by_strand)
    }
}
