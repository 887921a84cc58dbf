use clap::{Arg, ArgAction, Command, arg};

pub const OUTERSECT_CMD: &str = "outersect";

pub fn create_outersect_cli() -> Command {
    Command::new(OUTERSECT_CMD)
        .author("GeneExt")
        .about("Keep the regions of one BED file that overlap nothing in another")
        .arg_required_else_help(true)
        .arg(arg!(-a <a> "Regions to filter (BED)").required(true))
        .arg(arg!(-b <b> "Regions to stay clear of (BED)").required(true))
        .arg(arg!(-o --output <output> "Output BED file, stdout when left out").required(false))
        .arg(
            Arg::new("ignore-strand")
                .long("ignore-strand")
                .action(ArgAction::SetTrue)
                .help("Count overlaps on opposite strands too"),
        )
        .arg(arg!(-v --verbose ... "More logging (-v info, -vv debug)"))
}
