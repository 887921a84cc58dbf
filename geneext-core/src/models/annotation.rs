use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};

use crate::errors::GeneextError;
use crate::models::{AnnotationFormat, FeatureType, GeneFeature};

///
/// Annotation struct, an arena of features in file order.
///
/// The gene -> transcript -> exon tree is kept as index lists next to the
/// features: children are found through `children`, parents through
/// `parents`, nothing holds a reference to anything else.
///
#[derive(Debug, Clone)]
pub struct Annotation {
    pub format: AnnotationFormat,
    features: Vec<GeneFeature>,
    ids: HashMap<String, Vec<usize>>,
    parents: Vec<Option<usize>>,
    children: HashMap<usize, Vec<usize>>,
}

impl Annotation {
    pub fn new(format: AnnotationFormat) -> Self {
        Annotation {
            format,
            features: Vec::new(),
            ids: HashMap::new(),
            parents: Vec::new(),
            children: HashMap::new(),
        }
    }

    ///
    /// Rebuild the feature tree from flat records.
    ///
    /// Parents may appear after their children in the input; a parent id
    /// that matches no record leaves the child detached (it is still kept
    /// and written back out).
    ///
    pub fn from_features(format: AnnotationFormat, features: Vec<GeneFeature>) -> Self {
        let mut annotation = Annotation::new(format);

        for (idx, feature) in features.iter().enumerate() {
            if feature.has_id() {
                annotation
                    .ids
                    .entry(feature.id().to_string())
                    .or_default()
                    .push(idx);
            }
        }
        annotation.features = features;

        let parents: Vec<Option<usize>> = (0..annotation.features.len())
            .map(|idx| annotation.resolve_parent(&annotation.features[idx]))
            .collect();
        for (idx, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                annotation.children.entry(*parent).or_default().push(idx);
            }
        }
        annotation.parents = parents;

        annotation
    }

    fn resolve_parent(&self, feature: &GeneFeature) -> Option<usize> {
        let parent_id = feature.parent_id.as_deref()?;
        let candidates = self.ids.get(parent_id)?;
        let wanted = feature.feature_type.parent_level();

        candidates
            .iter()
            .copied()
            .find(|&c| Some(self.features[c].feature_type) == wanted)
            .or_else(|| candidates.first().copied())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[GeneFeature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<GeneFeature> {
        self.features
    }

    pub fn get(&self, idx: usize) -> Option<&GeneFeature> {
        self.features.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneFeature> {
        self.features.iter()
    }

    /// First feature carrying `id`, preferring the given level.
    pub fn find(&self, id: &str, level: Option<FeatureType>) -> Option<usize> {
        let candidates = self.ids.get(id)?;
        match level {
            Some(level) => candidates
                .iter()
                .copied()
                .find(|&c| self.features[c].feature_type == level),
            None => candidates.first().copied(),
        }
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(&idx).map_or(&[], |c| c.as_slice())
    }

    /// Every feature below `idx`, in file order.
    pub fn descendants(&self, idx: usize) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut stack: Vec<usize> = self.children(idx).to_vec();
        while let Some(child) = stack.pop() {
            // guard against cyclic Parent attributes in broken files
            if child == idx || !seen.insert(child) {
                continue;
            }
            stack.extend_from_slice(self.children(child));
        }
        let mut found: Vec<usize> = seen.into_iter().collect();
        found.sort_unstable();
        found
    }

    ///
    /// Iterate top level genes together with their arena index
    ///
    pub fn genes(&self) -> impl Iterator<Item = (usize, &GeneFeature)> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_gene())
    }

    pub fn transcripts(&self, gene: usize) -> Vec<usize> {
        self.children_of_level(gene, FeatureType::Transcript)
    }

    pub fn exons(&self, transcript: usize) -> Vec<usize> {
        self.children_of_level(transcript, FeatureType::Exon)
    }

    fn children_of_level(&self, idx: usize, level: FeatureType) -> Vec<usize> {
        self.children(idx)
            .iter()
            .copied()
            .filter(|&c| self.features[c].feature_type == level)
            .collect()
    }

    ///
    /// Check that every transcript of the gene lies within the gene and every
    /// exon within its transcript.
    ///
    pub fn check_nesting(&self, gene: usize) -> Result<(), GeneextError> {
        let gene_feature = &self.features[gene];
        for tx in self.transcripts(gene) {
            let tx_feature = &self.features[tx];
            if !gene_feature.region.contains(&tx_feature.region) {
                return Err(GeneextError::malformed(
                    gene_feature.id(),
                    format!(
                        "transcript '{}' ({}-{}) lies outside the gene ({}-{})",
                        tx_feature.id(),
                        tx_feature.region.start,
                        tx_feature.region.end,
                        gene_feature.region.start,
                        gene_feature.region.end,
                    ),
                ));
            }
            for exon in self.exons(tx) {
                let exon_region = &self.features[exon].region;
                if !tx_feature.region.contains(exon_region) {
                    return Err(GeneextError::malformed(
                        gene_feature.id(),
                        format!(
                            "exon {}-{} lies outside transcript '{}' ({}-{})",
                            exon_region.start,
                            exon_region.end,
                            tx_feature.id(),
                            tx_feature.region.start,
                            tx_feature.region.end,
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Annotation ({}) with {} features, {} genes.",
            self.format,
            self.len(),
            self.genes().count()
        )
    }
}
