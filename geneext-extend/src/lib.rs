//! # geneext-extend
//!
//! Grow genes at their 3' end into nearby peaks. The steps can be used one by
//! one or all together through [`pipeline::run`]:
//!
//! 1. drop peaks that already overlap a gene on their strand ([`geneext_overlaprs::outersect`])
//! 2. optionally drop peaks under a coverage percentile ([`coverage::filter_by_coverage`])
//! 3. extend every gene into its farthest downstream peak ([`extend::extend_genes`])
//! 4. optionally turn unclaimed peaks into genes ([`orphan::assign_orphans`])
//!
//! ```rust
//! use geneext_core::models::{Peak, Region, Strand};
//! use geneext_extend::config::ExtendConfig;
//! use geneext_extend::extend::{annotation_from_regions, extend_genes};
//!
//! let genes = annotation_from_regions(vec![Region::new("chr1", 100, 1000, Strand::Plus, "G1")]);
//! let peaks = vec![Peak::new(Region::new("chr1", 1200, 1300, Strand::Plus, "P1"), 5.0)];
//!
//! let config = ExtendConfig { max_dist: 500, ..Default::default() };
//! let extension = extend_genes(&genes, &peaks, &config).unwrap().value;
//!
//! // G1 is kept as read, its extended copy follows
//! let copy = &extension.annotation.features()[1];
//! assert_eq!(copy.id(), "G1GE");
//! assert_eq!(copy.region.end, 1300);
//! ```
pub mod config;
pub mod coverage;
pub mod extend;
pub mod orphan;
pub mod pipeline;

pub use config::{ConfigError, ExtendConfig, ExtensionMode};
pub use extend::{ExtendedGene, Extension, extend_genes};
pub use pipeline::{PipelineOutput, RunSummary, run};
