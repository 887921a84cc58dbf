use std::fmt::{self, Display};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneextError {
    /// A record is missing required fields or has unparseable ones.
    #[error("Malformed record '{record}': {reason}")]
    Format { record: String, reason: String },

    /// The gene -> transcript -> exon nesting is violated.
    #[error("Malformed annotation for gene '{gene}': {reason}")]
    MalformedAnnotation { gene: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format combination: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GeneextError {
    pub fn format<R: Into<String>, S: Into<String>>(record: R, reason: S) -> Self {
        GeneextError::Format {
            record: record.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed<G: Into<String>, S: Into<String>>(gene: G, reason: S) -> Self {
        GeneextError::MalformedAnnotation {
            gene: gene.into(),
            reason: reason.into(),
        }
    }
}

/// Severity of a [Diagnostic].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The record was processed but something about it is worth reporting.
    Warning,
    /// The record could not be processed and was skipped.
    Error,
}

///
/// A per-record problem that did not abort the operation.
///
#[derive(Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: GeneextError,
}

impl Diagnostic {
    pub fn warning(error: GeneextError) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            error,
        }
    }

    pub fn error(error: GeneextError) -> Self {
        Diagnostic {
            severity: Severity::Error,
            error,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.error),
            Severity::Error => write!(f, "skipped: {}", self.error),
        }
    }
}

///
/// A result value together with the diagnostics collected while producing it.
///
/// Whole-operation failures are returned as `Err(GeneextError)` instead; a
/// `Reported` value is always usable, the diagnostics only describe what was
/// left out or looked suspicious along the way.
///
#[derive(Debug)]
pub struct Reported<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Reported<T> {
    pub fn with_diagnostics(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Reported { value, diagnostics }
    }

    /// Move the diagnostics into `sink` and return the bare value.
    pub fn drain_into(self, sink: &mut Vec<Diagnostic>) -> T {
        sink.extend(self.diagnostics);
        self.value
    }
}
