//! Flatten structured features into plain regions (the gxf -> bed step).
use crate::errors::{Diagnostic, GeneextError, Reported};
use crate::models::{Annotation, FeatureType, GeneFeature, Region};

///
/// Extract one region per feature of `feature_type`, keeping strand and id.
///
/// A feature without an identifier, or with `start > end`, is reported and
/// left out; everything else passes through in input order.
///
pub fn to_regions(features: &[GeneFeature], feature_type: FeatureType) -> Reported<Vec<Region>> {
    let mut regions = Vec::new();
    let mut diagnostics = Vec::new();

    for feature in features.iter().filter(|f| f.feature_type == feature_type) {
        let region = &feature.region;
        let record = || format!("{}:{}-{}", region.chr, region.start, region.end);

        if !feature.has_id() {
            diagnostics.push(Diagnostic::error(GeneextError::format(
                record(),
                format!("{} has no identifier", feature.type_label),
            )));
            continue;
        }
        if region.start > region.end {
            diagnostics.push(Diagnostic::error(GeneextError::format(
                record(),
                "start is greater than end",
            )));
            continue;
        }

        regions.push(region.clone());
    }

    Reported::with_diagnostics(regions, diagnostics)
}

/// Gene regions of an annotation.
pub fn genes_to_regions(annotation: &Annotation) -> Reported<Vec<Region>> {
    to_regions(annotation.features(), FeatureType::Gene)
}
