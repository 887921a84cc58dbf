use crate::models::{AnnotationFormat, CoordinateSystem, Region};

/// Level of a feature in the gene -> transcript -> exon hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Gene,
    Transcript,
    Exon,
    Other,
}

impl FeatureType {
    ///
    /// Map a feature type column (GTF/GFF column 3) onto a hierarchy level.
    ///
    /// GFF3 files name transcripts after their biotype (`mRNA`, `lnc_RNA`, ...),
    /// those all count as transcripts.
    ///
    pub fn classify(label: &str) -> Self {
        match label {
            "gene" | "ncRNA_gene" | "pseudogene" => FeatureType::Gene,
            "transcript" | "mRNA" | "ncRNA" | "lnc_RNA" | "lncRNA" | "tRNA" | "rRNA"
            | "snRNA" | "snoRNA" | "miRNA" | "scRNA" | "primary_transcript"
            | "pseudogenic_transcript" | "unconfirmed_transcript" => FeatureType::Transcript,
            "exon" => FeatureType::Exon,
            _ => FeatureType::Other,
        }
    }

    /// The level a parent of this feature is expected to have.
    pub fn parent_level(&self) -> Option<FeatureType> {
        match self {
            FeatureType::Gene => None,
            FeatureType::Transcript => Some(FeatureType::Gene),
            FeatureType::Exon | FeatureType::Other => Some(FeatureType::Transcript),
        }
    }
}

/// Attribute key that holds a feature's own identifier.
pub fn id_key(format: AnnotationFormat, feature_type: FeatureType) -> Option<&'static str> {
    match (format, feature_type) {
        (AnnotationFormat::Gtf, FeatureType::Gene) => Some("gene_id"),
        (AnnotationFormat::Gtf, FeatureType::Transcript) => Some("transcript_id"),
        (AnnotationFormat::Gtf, FeatureType::Exon) => Some("exon_id"),
        (AnnotationFormat::Gtf, FeatureType::Other) => None,
        (AnnotationFormat::Gff, _) => Some("ID"),
        (AnnotationFormat::Bed, _) => None,
    }
}

/// Attribute key that points at a feature's parent.
pub fn parent_key(format: AnnotationFormat, feature_type: FeatureType) -> Option<&'static str> {
    match (format, feature_type) {
        (_, FeatureType::Gene) => None,
        (AnnotationFormat::Gtf, FeatureType::Transcript) => Some("gene_id"),
        (AnnotationFormat::Gtf, _) => Some("transcript_id"),
        (AnnotationFormat::Gff, _) => Some("Parent"),
        (AnnotationFormat::Bed, _) => None,
    }
}

///
/// Ordered key/value attributes of a feature (GTF/GFF column 9).
///
/// Keys may repeat (GTF `tag "basic"; tag "CCDS";`), so this is a list rather
/// than a map. Lookups return the first match.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first value stored under `key`, or append it.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Append without looking for an existing key.
    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

///
/// Where an unmodified feature was read from. Writers re-emit `line`
/// verbatim when the output format and coordinate system match, so an
/// untouched record round-trips exactly.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub line: String,
    pub format: AnnotationFormat,
    pub coords: CoordinateSystem,
}

///
/// One structured annotation record.
///
/// `region.id` is the feature's own identifier (empty when the record has
/// none, e.g. GTF exons without `exon_id`).
///
#[derive(Debug, Clone, PartialEq)]
pub struct GeneFeature {
    pub region: Region,
    pub feature_type: FeatureType,
    /// Column 3 as written in the file (`mRNA`, `transcript`, ...).
    pub type_label: String,
    pub source: String,
    pub phase: String,
    pub attributes: Attributes,
    pub parent_id: Option<String>,
    pub origin: Option<Origin>,
}

impl GeneFeature {
    pub fn new<L: Into<String>, S: Into<String>>(
        region: Region,
        type_label: L,
        source: S,
    ) -> Self {
        let type_label = type_label.into();
        GeneFeature {
            region,
            feature_type: FeatureType::classify(&type_label),
            type_label,
            source: source.into(),
            phase: ".".to_string(),
            attributes: Attributes::new(),
            parent_id: None,
            origin: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.region.id
    }

    pub fn has_id(&self) -> bool {
        !self.region.id.is_empty()
    }

    pub fn is_gene(&self) -> bool {
        self.feature_type == FeatureType::Gene
    }

    pub fn is_transcript(&self) -> bool {
        self.feature_type == FeatureType::Transcript
    }

    pub fn is_exon(&self) -> bool {
        self.feature_type == FeatureType::Exon
    }

    ///
    /// A copy that no longer claims to be the record read from disk. Every
    /// modified or synthetic feature goes through here.
    ///
    pub fn detached(&self) -> GeneFeature {
        GeneFeature {
            origin: None,
            ..self.clone()
        }
    }

    /// Change the identifier, keeping the format's id attribute in sync.
    pub fn set_id<S: Into<String>>(&mut self, format: AnnotationFormat, id: S) {
        let id = id.into();
        if let Some(key) = id_key(format, self.feature_type) {
            self.attributes.set(key, id.clone());
        }
        self.region.id = id;
        self.origin = None;
    }

    ///
    /// Every parent the record names. GFF3 allows `Parent=T1,T2`; the tree
    /// hangs the feature under the first one only.
    ///
    pub fn parent_ids(&self, format: AnnotationFormat) -> Vec<&str> {
        let listed = parent_key(format, self.feature_type).and_then(|key| self.attributes.get(key));
        match listed {
            Some(value) if format == AnnotationFormat::Gff => value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect(),
            Some(value) => vec![value],
            None => self.parent_id.as_deref().into_iter().collect(),
        }
    }

    /// Re-point the feature at another parent.
    pub fn set_parent<S: Into<String>>(&mut self, format: AnnotationFormat, parent: S) {
        let parent = parent.into();
        self.set_parents(format, &[parent.as_str()]);
    }

    /// Re-point the feature at a list of parents, the first one owning it.
    pub fn set_parents(&mut self, format: AnnotationFormat, parents: &[&str]) {
        if let Some(key) = parent_key(format, self.feature_type) {
            self.attributes.set(key, parents.join(","));
        }
        self.parent_id = parents.first().map(|p| p.to_string());
        self.origin = None;
    }

    pub fn set_bounds(&mut self, start: u64, end: u64) {
        self.region.start = start;
        self.region.end = end;
        self.origin = None;
    }
}
