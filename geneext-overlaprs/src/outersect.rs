//! Keep only the intervals that stay clear of another set.
use geneext_core::models::Region;

use crate::multi_chrom_overlapper::IntoMultiChromOverlapper;

///
/// Return every element of `a` that overlaps **no** element of `b`.
///
/// With `by_strand`, an overlap needs the same chromosome, the same strand and
/// at least one shared base; without it strand is ignored. Kept elements are
/// returned whole and in their original order. Touching half-open intervals
/// do not overlap.
///
/// `b` is indexed once, so the cost is `O((|a| + |b|) log |b|)`.
///
/// # Arguments
/// - a: candidates (usually peaks)
/// - b: the set to stay clear of (usually genes)
/// - by_strand: whether overlaps on opposite strands count
///
pub fn outersect<A, B>(a: Vec<A>, b: &[B], by_strand: bool) -> Vec<A>
where
    A: AsRef<Region>,
    B: AsRef<Region>,
{
    if a.is_empty() || b.is_empty() {
        return a;
    }

    let index = b.into_multi_chrom_overlapper(by_strand);

    a.into_iter()
        .filter(|candidate| !index.overlaps_region(candidate.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use geneext_core::models::{Peak, Strand};
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use rstest::*;

    fn ids<R: AsRef<Region>>(regions: &[R]) -> Vec<&str> {
        regions.iter().map(|r| r.as_ref().id.as_str()).collect()
    }

    #[fixture]
    fn genes() -> Vec<Region> {
        vec![
            Region::new("chr1", 100, 1000, Strand::Plus, "G1"),
            Region::new("chr1", 2000, 3000, Strand::Minus, "G2"),
        ]
    }

    #[fixture]
    fn peaks() -> Vec<Peak> {
        vec![
            // inside G1
            Peak::new(Region::new("chr1", 900, 1100, Strand::Plus, "p_in_g1"), 5.0),
            // downstream of G1, clear
            Peak::new(Region::new("chr1", 1200, 1300, Strand::Plus, "p_down"), 3.0),
            // touches G1 end
            Peak::new(Region::new("chr1", 1000, 1050, Strand::Plus, "p_adjacent"), 1.0),
            // inside G2 on the opposite strand
            Peak::new(Region::new("chr1", 2500, 2600, Strand::Plus, "p_opposite"), 2.0),
            // other chromosome
            Peak::new(Region::new("chr2", 100, 200, Strand::Plus, "p_chr2"), 9.0),
        ]
    }

    #[rstest]
    fn test_outersect_by_strand(genes: Vec<Region>, peaks: Vec<Peak>) {
        let kept = outersect(peaks, &genes, true);
        assert_eq!(
            ids(&kept),
            vec!["p_down", "p_adjacent", "p_opposite", "p_chr2"]
        );
        // kept peaks are returned whole, coverage included
        assert_eq!(kept[0].coverage, 3.0);
        assert_eq!(kept[0].region.end, 1300);
    }

    #[rstest]
    fn test_outersect_ignoring_strand(genes: Vec<Region>, peaks: Vec<Peak>) {
        let kept = outersect(peaks, &genes, false);
        assert_eq!(ids(&kept), vec!["p_down", "p_adjacent", "p_chr2"]);
    }

    #[rstest]
    fn test_outersect_identities(genes: Vec<Region>, peaks: Vec<Peak>) {
        let none: Vec<Region> = vec![];
        assert_eq!(outersect(peaks.clone(), &none, true), peaks);

        let empty: Vec<Peak> = vec![];
        assert!(outersect(empty, &genes, true).is_empty());
    }

    #[rstest]
    fn test_outersect_is_idempotent(genes: Vec<Region>, peaks: Vec<Peak>) {
        let once = outersect(peaks, &genes, true);
        let twice = outersect(once.clone(), &genes, true);
        assert_eq!(once, twice);
    }

    #[rstest]
    fn test_outersect_random_sets_hold_invariants() {
        let mut rng = rand::rng();
        let random_region = |rng: &mut rand::rngs::ThreadRng, id: String| {
            let start = rng.random_range(0..10_000u64);
            let len = rng.random_range(1..500u64);
            let strand = if rng.random_bool(0.5) {
                Strand::Plus
            } else {
                Strand::Minus
            };
            let chr = if rng.random_bool(0.5) { "chr1" } else { "chr2" };
            Region::new(chr, start, start + len, strand, id)
        };

        let a: Vec<Region> = (0..300)
            .map(|i| random_region(&mut rng, format!("a{}", i)))
            .collect();
        let b: Vec<Region> = (0..100)
            .map(|i| random_region(&mut rng, format!("b{}", i)))
            .collect();

        for by_strand in [true, false] {
            let kept = outersect(a.clone(), &b, by_strand);

            // subset, order preserved
            let mut cursor = a.iter();
            for k in &kept {
                assert!(cursor.any(|x| x == k));
            }
            // nothing kept overlaps b
            for k in &kept {
                assert!(b.iter().all(|g| !k.overlaps(g, by_strand)));
            }
            // nothing dropped was overlap-free
            let dropped = a.len() - kept.len();
            let expected_dropped = a
                .iter()
                .filter(|x| b.iter().any(|g| x.overlaps(g, by_strand)))
                .count();
            assert_eq!(dropped, expected_dropped);
        }
    }
}
