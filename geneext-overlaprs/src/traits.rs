use num_traits::{PrimInt, Unsigned};

pub use geneext_core::models::Interval;

/// An index over the intervals of one sequence that answers overlap queries.
pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>>;

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    /// Does any interval overlap start .. end?
    fn any(&self, start: I, end: I) -> bool {
        self.find_iter(start, end).next().is_some()
    }
}
