use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use geneext_core::models::RegionSet;
use geneext_io::BedWrite;
use geneext_overlaprs::outersect;

pub fn run_outersect(matches: &ArgMatches) -> Result<()> {
    let a = matches
        .get_one::<String>("a")
        .context("A path to the regions to filter is required.")?;
    let b = matches
        .get_one::<String>("b")
        .context("A path to the regions to compare against is required.")?;
    let by_strand = !matches.get_flag("ignore-strand");

    let a = RegionSet::try_from(Path::new(a))?;
    let b = RegionSet::try_from(Path::new(b))?;
    let total = a.len();

    let kept = RegionSet::from(outersect(a.regions, &b.regions, by_strand));
    info!("{} of {} regions overlap nothing", kept.len(), total);

    match matches.get_one::<String>("output") {
        Some(output) => {
            let written = match output.ends_with(".gz") {
                true => kept.write_bed_gz(output),
                false => kept.write_bed(output),
            };
            written.with_context(|| format!("Failed to write {}", output))?
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            for region in &kept {
                writeln!(writer, "{}", region.as_string())?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}
