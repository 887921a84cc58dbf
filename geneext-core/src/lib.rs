//! Core types for geneext: strand-aware genomic regions, peaks and gene models.
//!
//! Everything in here is 0-based half-open. Readers in `geneext-io` convert
//! from whatever convention a file uses (see [`models::CoordinateSystem`]) and
//! writers convert back, so the engine crates never have to think about it.
//!
//! ```rust
//! use geneext_core::models::{Region, Strand};
//!
//! let gene = Region::new("chr1", 100, 1000, Strand::Plus, "G1");
//! let peak = Region::new("chr1", 1000, 1100, Strand::Plus, "P1");
//!
//! // half-open: touching is not overlapping
//! assert!(!gene.overlaps(&peak, true));
//! assert_eq!(gene.three_prime(), Some(1000));
//! ```
pub mod bridge;
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::{Diagnostic, GeneextError, Reported};
