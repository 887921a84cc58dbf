use anyhow::Result;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::models::Region;
use crate::utils::get_dynamic_reader;

///
/// RegionSet struct, the representation of the interval region set file,
/// such as bed file.
///
#[derive(Clone, Debug, Default)]
pub struct RegionSet {
    pub regions: Vec<Region>,
    pub header: Option<String>,
    pub path: Option<PathBuf>,
}

pub struct RegionSetIterator<'a> {
    region_set: &'a RegionSet,
    index: usize,
}

impl TryFrom<&Path> for RegionSet {
    type Error = anyhow::Error;

    ///
    /// Create a new [RegionSet] from a bed file. Any malformed line fails the
    /// whole read; use `geneext_io::read_peaks` for a lenient reader.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;

        let mut regions: Vec<Region> = Vec::new();
        let mut header = String::new();

        for line in reader.lines() {
            let line = line?;

            if line.starts_with("browser") || line.starts_with("track") || line.starts_with('#') {
                header.push_str(&line);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            regions.push(Region::from_bed_line(&line)?);
        }

        Ok(RegionSet {
            regions,
            header: match header.is_empty() {
                true => None,
                false => Some(header),
            },
            path: Some(value.to_owned()),
        })
    }
}

impl From<Vec<Region>> for RegionSet {
    fn from(regions: Vec<Region>) -> Self {
        RegionSet {
            regions,
            header: None,
            path: None,
        }
    }
}

impl<'a> Iterator for RegionSetIterator<'a> {
    type Item = &'a Region;

    fn next(&mut self) -> Option<Self::Item> {
        let region = self.region_set.regions.get(self.index)?;
        self.index += 1;
        Some(region)
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = RegionSetIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        RegionSetIterator {
            region_set: self,
            index: 0,
        }
    }
}

impl RegionSet {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    ///
    /// Is regionSet empty?
    ///
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
