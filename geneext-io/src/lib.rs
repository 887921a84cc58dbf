//! # Input/Output for geneext.
//!
//! Readers and writers for the formats geneext works with: GTF and GFF3
//! gene annotations, BED annotations and BED peak files. Everything can be
//! gzip-compressed. Readers never fail on a single bad line; they skip it
//! and hand back a diagnostic instead (see [`geneext_core::Reported`]).
//!
pub mod bed;
pub mod error;
pub mod gxf;

// re-expose core functions
pub use bed::*;
pub use error::*;
pub use gxf::*;
