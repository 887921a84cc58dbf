use num_traits::{PrimInt, Unsigned, identities::zero};

use super::Overlapper;
use geneext_core::models::Interval;

/// A Binary Interval Search data structure for fast genomic interval overlap queries.
///
/// From the journal article: <https://academic.oup.com/bioinformatics/article/29/1/1/273289>
///
/// Intervals are kept sorted by start, plus the length of the longest
/// one. A query binary-searches to `start - max_len` and scans forward until
/// an interval starts past the query end, so each lookup is
/// `O(log n + hits)`.
///
/// # Examples
///
/// ```
/// use geneext_overlaprs::{Bits, Overlapper, Interval};
///
/// // gene bodies on one chromosome, payload is the index of the gene
/// let genes = vec![
///     Interval { start: 100u64, end: 1000, val: 0usize },
///     Interval { start: 2000, end: 2500, val: 1 },
///     Interval { start: 2400, end: 3000, val: 2 },
/// ];
///
/// let bits = Bits::build(genes);
///
/// // a peak at 2450..2460 lands in genes 1 and 2
/// assert_eq!(bits.find(2450, 2460).len(), 2);
///
/// // half-open: a peak starting where gene 0 ends does not touch it
/// assert!(!bits.any(1000, 1100));
/// ```
#[derive(Debug, Clone)]
pub struct Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// List of intervals
    pub intervals: Vec<Interval<I, T>>,
    /// The length of the longest interval
    max_len: I,
}

impl<I, T> Overlapper<I, T> for Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Create a new instance of Bits by passing in a vector of Intervals. This vector will
    /// immediately be sorted by start order.
    /// ```
    /// use geneext_overlaprs::{Bits, Overlapper};
    /// use geneext_core::models::Interval;
    ///
    /// let data = (0..20).step_by(5)
    ///                   .map(|x| Interval{start: x, end: x + 10, val: true})
    ///                   .collect::<Vec<Interval<u64, bool>>>();
    /// let bits = Bits::build(data);
    /// assert_eq!(bits.len(), 4);
    /// ```
    fn build(mut intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        intervals.sort();
        let max_len = intervals
            .iter()
            .map(|interval| interval.len())
            .max()
            .unwrap_or_else(zero::<I>);
        Bits { intervals, max_len }
    }

    /// Find all intervals that overlap start .. stop
    #[inline]
    fn find(&self, start: I, stop: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, stop).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        stop: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(self.iter_find(start, stop))
    }
}

impl<I, T> Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Get the number over intervals in Bits
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Check if BITS is empty (i.e. has no intervals)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[inline]
    fn iter_find(&self, start: I, stop: I) -> IterFind<'_, I, T> {
        IterFind {
            inner: self,
            off: Self::lower_bound(
                start.checked_sub(&self.max_len).unwrap_or_else(zero::<I>),
                &self.intervals,
            ),
            start,
            stop,
        }
    }

    /// Determine the first index that we should start checking for overlaps for via a binary
    /// search.
    /// Assumes that the maximum interval length in `intervals` has been subtracted from
    /// `start`, otherwise the result is undefined
    #[inline]
    pub fn lower_bound(start: I, intervals: &[Interval<I, T>]) -> usize {
        let mut size = intervals.len();
        let mut low = 0;

        while size > 0 {
            let half = size / 2;
            let other_half = size - half;
            let probe = low + half;
            let other_low = low + other_half;
            let v = &intervals[probe];
            size = half;
            low = if v.start < start { other_low } else { low }
        }
        low
    }
}

/// An iterator over intervals in a [`Bits`] structure that overlap with a query range.
///
/// Created by [`find_iter`](Overlapper::find_iter).
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    T: Eq + Clone + Send + Sync + 'a,
    I: PrimInt + Unsigned + Send + Sync,
{
    inner: &'a Bits<I, T>,
    off: usize,
    start: I,
    stop: I,
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    T: Eq + Clone + Send + Sync + 'a,
    I: PrimInt + Unsigned + Send + Sync,
{
    type Item = &'a Interval<I, T>;

    #[inline]
    // interval.start < stop && interval.end > start
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.inner.intervals.len() {
            let interval = &self.inner.intervals[self.off];
            self.off += 1;
            if interval.overlap(self.start, self.stop) {
                return Some(interval);
            } else if interval.start >= self.stop {
                break;
            }
        }
        None
    }
}
