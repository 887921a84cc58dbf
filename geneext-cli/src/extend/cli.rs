use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const EXTEND_CMD: &str = "extend";

pub fn create_extend_cli() -> Command {
    Command::new(EXTEND_CMD)
        .author("GeneExt")
        .about("Extend genes at their 3' end into downstream peaks.")
        .arg_required_else_help(true)
        .arg(
            arg!(-g --genes <GENES>)
                .required(true)
                .help("Gene annotation (GTF, GFF3 or BED, optionally gzipped)"),
        )
        .arg(
            arg!(-p --peaks <PEAKS>)
                .required(true)
                .help("Peaks to extend genes into (BED, strand in column 6), - for stdin"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Where to write the extended annotation (.gz to compress)"),
        )
        .arg(
            arg!(-m --maxdist <MAXDIST>)
                .required(false)
                .value_parser(value_parser!(u64))
                .help("Longest distance a gene may be extended by [default: 10000]"),
        )
        .arg(
            arg!(-e --mode <MODE>)
                .required(false)
                .value_parser(["new_transcript", "new_mrna", "new_exon"])
                .help("new_transcript adds a transcript per gene, new_exon extends in place"),
        )
        .arg(
            arg!(--tag <TAG>)
                .required(false)
                .help("Marker added to ids and the source column of new records [default: GE]"),
        )
        .arg(
            arg!(--peakp <PERCENTILE>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Coverage percentile peaks must reach to be used [default: 75]"),
        )
        .arg(
            Arg::new("filter-coverage")
                .long("filter-coverage")
                .action(ArgAction::SetTrue)
                .help("Drop peaks below the coverage percentile before extending"),
        )
        .arg(
            Arg::new("coverage-column")
                .long("coverage-column")
                .required(false)
                .value_parser(value_parser!(usize))
                .help("1-based peak file column holding coverage; implies --filter-coverage"),
        )
        .arg(
            arg!(--orphan)
                .action(ArgAction::SetTrue)
                .help("Add peaks no gene claims as genes of their own (gtf -> gtf, gff -> gff)"),
        )
        .arg(
            arg!(--inf <FORMAT>)
                .required(false)
                .value_parser(["gtf", "gff", "bed"])
                .help("Annotation format, guessed from the extension by default"),
        )
        .arg(
            arg!(--ouf <FORMAT>)
                .required(false)
                .value_parser(["gtf", "gff", "bed"])
                .help("Output format, guessed from the extension by default"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML file with run settings; flags given on the command line win"),
        )
        .arg(
            Arg::new("peaks-out")
                .long("peaks-out")
                .required(false)
                .help("Also write the peaks used for extension to this BED file"),
        )
        .arg(
            arg!(--strict)
                .action(ArgAction::SetTrue)
                .help("Fail when any record had to be skipped or was suspicious"),
        )
        .arg(
            arg!(-j --threads <THREADS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of worker threads"),
        )
        .arg(
            arg!(-v --verbose ...)
                .help("More logging (-v info, -vv debug)"),
        )
}
