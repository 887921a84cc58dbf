//! Interval overlap machinery for geneext.
//!
//! All overlap computation lives here: the per-sequence [`Bits`] index, the
//! genome-wide [`MultiChromOverlapper`](multi_chrom_overlapper::MultiChromOverlapper)
//! (optionally keyed by strand) and [`outersect`](outersect::outersect), which
//! drops peaks that already sit on an annotated gene. Higher-level crates wrap
//! these for their own use cases but should not reimplement overlap logic.
//!
//! ## Quick Start
//!
//! ```rust
//! use geneext_overlaprs::outersect::outersect;
//! use geneext_core::models::{Region, Strand};
//!
//! let genes = vec![Region::new("chr1", 100, 1000, Strand::Plus, "G1")];
//! let peaks = vec![
//!     Region::new("chr1", 900, 1100, Strand::Plus, "inside"),
//!     Region::new("chr1", 1200, 1300, Strand::Plus, "downstream"),
//!     Region::new("chr1", 500, 600, Strand::Minus, "antisense"),
//! ];
//!
//! let kept = outersect(peaks, &genes, true);
//! let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
//! assert_eq!(ids, vec!["downstream", "antisense"]);
//! ```

/// Binary Interval Search implementation.
///
/// See [`Bits`] for details.
pub mod bits;

/// Genome-wide interval indexing.
pub mod multi_chrom_overlapper;

/// Set difference by overlap.
pub mod outersect;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::bits::Bits;
pub use self::multi_chrom_overlapper::{ChromKey, IntoMultiChromOverlapper, MultiChromOverlapper};
pub use self::outersect::outersect;
pub use self::traits::{Interval, Overlapper};
