use crate::models::Region;

///
/// A signal-supported interval proposed as 3' extension evidence.
///
/// `coverage` only matters when the peak came out of a statistical caller and
/// is run through the coverage filter; user supplied peaks carry whatever the
/// file's score column had (or 0).
///
#[derive(PartialEq, Debug, Clone)]
pub struct Peak {
    pub region: Region,
    pub coverage: f64,
}

impl Peak {
    pub fn new(region: Region, coverage: f64) -> Self {
        Peak { region, coverage }
    }
}

impl From<Region> for Peak {
    fn from(region: Region) -> Self {
        let coverage = region.score.unwrap_or(0.0);
        Peak { region, coverage }
    }
}

impl AsRef<Region> for Peak {
    fn as_ref(&self) -> &Region {
        &self.region
    }
}
