use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use firered_randomiser_core::{run, RandomiserSettings};

#[derive(Debug, Parser)]
#[command(name = "firered-randomiser", version, about = "Pokemon FireRed randomiser tool")]
struct Args {
    /// FireRed ROM image to read. Never modified.
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long)]
    seed: u64,

    /// JSON settings file; command-line values override it.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    #[arg(long)]
    no_wild: bool,

    #[arg(long)]
    no_trainers: bool,

    #[arg(long)]
    no_starters: bool,

    #[arg(long)]
    no_level_scaling: bool,

    #[arg(long)]
    expand_catalogs: bool,

    #[arg(long)]
    abort_on_validation_errors: bool,

    /// Also write JSON exports and a spoiler log.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn settings_from_args(args: Args) -> firered_randomiser_core::Result<RandomiserSettings> {
    let mut settings = match &args.config {
        Some(path) => RandomiserSettings::from_json_file(path)?,
        None => RandomiserSettings::default(),
    };

    settings.seed = args.seed;
    settings.input_path = args.input;
    settings.output_path = args.output;
    settings.debug |= args.debug;
    settings.randomize_wild &= !args.no_wild;
    settings.randomize_trainers &= !args.no_trainers;
    settings.randomize_starters &= !args.no_starters;
    settings.scale_trainer_levels &= !args.no_level_scaling;
    settings.expand_catalogs |= args.expand_catalogs;
    settings.abort_on_validation_errors |= args.abort_on_validation_errors;
    Ok(settings)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = settings_from_args(args).and_then(run);
    match result {
        Ok(report) => {
            tracing::info!(
                "done: {} wild, {} trainer, {} starter assignments, {} relaxations",
                report.outcome.wild.len(),
                report.outcome.trainers.len(),
                report.outcome.starters.len(),
                report.outcome.relaxations.len()
            );
            println!("{}", report.output_checksum);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
