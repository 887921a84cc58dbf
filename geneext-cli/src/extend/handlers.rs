use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use geneext_core::Diagnostic;
use geneext_core::models::AnnotationFormat;
use geneext_core::utils::get_dynamic_reader_w_stdin;
use geneext_extend::config::{ExtendConfig, ExtensionMode};
use geneext_extend::pipeline;
use geneext_io::{
    BedWrite, check_output_format, read_annotation, read_peaks_from, write_annotation,
};

fn format_for(matches: &ArgMatches, flag: &str, path: &Path) -> Result<AnnotationFormat> {
    let format = match matches.get_one::<String>(flag) {
        Some(name) => name.parse::<AnnotationFormat>()?,
        None => AnnotationFormat::from_path(path).with_context(|| {
            format!(
                "Can't tell the format of {}, use --{}",
                path.display(),
                flag
            )
        })?,
    };
    Ok(format)
}

///
/// Start from the config file (or the defaults) and apply every flag the
/// user actually gave.
///
fn build_config(matches: &ArgMatches) -> Result<ExtendConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ExtendConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path))?,
        None => ExtendConfig::default(),
    };

    if let Some(max_dist) = matches.get_one::<u64>("maxdist") {
        config.max_dist = *max_dist;
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.extension_mode = mode.parse::<ExtensionMode>()?;
    }
    if let Some(tag) = matches.get_one::<String>("tag") {
        config.tag = tag.clone();
    }
    if let Some(percentile) = matches.get_one::<f64>("peakp") {
        config.coverage_percentile = *percentile;
    }
    if matches.get_flag("filter-coverage") || matches.contains_id("coverage-column") {
        config.filter_coverage = true;
    }
    if matches.get_flag("orphan") {
        config.orphan = true;
    }

    config.validate()?;
    Ok(config)
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!("{}", diagnostic);
    }
}

pub fn run_extend(matches: &ArgMatches) -> Result<()> {
    let genes = matches
        .get_one::<String>("genes")
        .context("A path to a gene annotation is required.")?;
    let peaks = matches
        .get_one::<String>("peaks")
        .context("A path to a peak file is required.")?;
    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;

    let genes = Path::new(genes);
    let output = Path::new(output);

    let input_format = format_for(matches, "inf", genes)?;
    let output_format = format_for(matches, "ouf", output)?;
    check_output_format(input_format, output_format)?;

    let config = build_config(matches)?;
    let coverage_column = matches.get_one::<usize>("coverage-column").copied();
    let threads = matches.get_one::<usize>("threads").copied().unwrap_or(1);
    let strict = matches.get_flag("strict");

    let mut diagnostics = Vec::new();

    info!("Reading {} annotation {}", input_format, genes.display());
    let annotation = read_annotation(genes, input_format, input_format.default_coordinates())
        .with_context(|| format!("Failed to read annotation {}", genes.display()))?
        .drain_into(&mut diagnostics);
    info!("{}", annotation);

    info!("Reading peaks {}", peaks);
    let reader = get_dynamic_reader_w_stdin(peaks)?;
    let peaks = read_peaks_from(reader, coverage_column)
        .with_context(|| format!("Failed to read peaks {}", peaks))?
        .drain_into(&mut diagnostics);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to start the worker pool")?;

    let result = pool.install(|| pipeline::run(&annotation, peaks, &config, output_format))?;
    let result = result.drain_into(&mut diagnostics);

    info!("Writing {} annotation {}", output_format, output.display());
    write_annotation(
        output,
        &result.annotation,
        output_format,
        output_format.default_coordinates(),
    )
    .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(peaks_out) = matches.get_one::<String>("peaks-out") {
        let written = match peaks_out.ends_with(".gz") {
            true => result.used_peaks.write_bed_gz(peaks_out),
            false => result.used_peaks.write_bed(peaks_out),
        };
        written.with_context(|| format!("Failed to write peaks to {}", peaks_out))?;
    }

    report(&diagnostics);
    if strict && !diagnostics.is_empty() {
        anyhow::bail!(
            "{} records were skipped or flagged, failing because of --strict",
            diagnostics.len()
        );
    }

    Ok(())
}
