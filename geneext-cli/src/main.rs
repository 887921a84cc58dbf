mod extend;
mod outersect;

use anyhow::Result;
use clap::{ArgMatches, Command};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "geneext";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("GeneExt")
        .about("Extend gene models at their 3' end into peaks from 3'-end sequencing.")
        .subcommand_required(true)
        .subcommand(extend::cli::create_extend_cli())
        .subcommand(outersect::cli::create_outersect_cli())
}

/// `RUST_LOG` still wins over `-v`.
fn init_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // EXTEND
        //
        Some((extend::cli::EXTEND_CMD, matches)) => {
            init_logging(matches);
            extend::handlers::run_extend(matches)?;
        }

        //
        // OUTERSECT
        //
        Some((outersect::cli::OUTERSECT_CMD, matches)) => {
            init_logging(matches);
            outersect::handlers::run_outersect(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
