use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use geneext_core::GeneextError;

pub const DEFAULT_MAX_DIST: u64 = 10_000;
pub const DEFAULT_TAG: &str = "GE";
pub const DEFAULT_COVERAGE_PERCENTILE: f64 = 75.0;

/// Attribute added to every record geneext creates or modifies.
pub const PROVENANCE_ATTRIBUTE: &str = "geneext_tag";

/// How an extended gene is written out.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMode {
    /// Add a copy of the 3'-most transcript with its last exon extended.
    #[default]
    NewTranscript,
    /// Extend the last exon of the 3'-most transcript itself.
    NewExon,
}

impl FromStr for ExtensionMode {
    type Err = GeneextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_transcript" | "new_mrna" => Ok(ExtensionMode::NewTranscript),
            "new_exon" => Ok(ExtensionMode::NewExon),
            other => Err(GeneextError::InvalidParameter(format!(
                "unknown extension mode '{}' (expected new_transcript or new_exon)",
                other
            ))),
        }
    }
}

impl Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionMode::NewTranscript => write!(f, "new_transcript"),
            ExtensionMode::NewExon => write!(f, "new_exon"),
        }
    }
}

///
/// Settings for one geneext run.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtendConfig {
    /// Longest distance a gene may grow by.
    pub max_dist: u64,
    pub extension_mode: ExtensionMode,
    /// Marker appended to ids and written as source of new records.
    pub tag: String,
    /// Peaks under this coverage percentile are dropped when `filter_coverage` is set.
    pub coverage_percentile: f64,
    pub filter_coverage: bool,
    /// Promote peaks no gene claimed to genes of their own.
    pub orphan: bool,
}

impl Default for ExtendConfig {
    fn default() -> Self {
        ExtendConfig {
            max_dist: DEFAULT_MAX_DIST,
            extension_mode: ExtensionMode::default(),
            tag: DEFAULT_TAG.to_string(),
            coverage_percentile: DEFAULT_COVERAGE_PERCENTILE,
            filter_coverage: false,
            orphan: false,
        }
    }
}

impl ExtendConfig {
    ///
    /// Reject settings that make the whole run meaningless.
    ///
    pub fn validate(&self) -> Result<(), GeneextError> {
        if self.max_dist == 0 {
            return Err(GeneextError::InvalidParameter(
                "max_dist must be a positive integer".to_string(),
            ));
        }
        if self.tag.trim().is_empty() {
            return Err(GeneextError::InvalidParameter(
                "tag must not be empty".to_string(),
            ));
        }
        if self.tag.chars().any(|c| c.is_whitespace() || c == ';' || c == '"') {
            return Err(GeneextError::InvalidParameter(format!(
                "tag '{}' can't contain whitespace, ';' or '\"'",
                self.tag
            )));
        }
        check_percentile(self.coverage_percentile)
    }
}

pub(crate) fn check_percentile(percentile: f64) -> Result<(), GeneextError> {
    if percentile.is_nan() || !(0.0..=100.0).contains(&percentile) {
        return Err(GeneextError::InvalidParameter(format!(
            "percentile must be within [0, 100], got {}",
            percentile
        )));
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl TryFrom<&Path> for ExtendConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> ConfigResult<Self> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
