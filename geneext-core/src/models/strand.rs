use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::GeneextError;

/// Strand of a genomic feature. Anything that is not `+` or `-` is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

impl FromStr for Strand {
    type Err = GeneextError;

    /// Strict parse of a strand column: `+`, `-`, `.` (or `?`) only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            "." | "?" => Ok(Strand::Unknown),
            other => Err(GeneextError::format(
                other,
                "strand must be one of '+', '-', '.'",
            )),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
