mod cli;
mod core;
mod util;

use clap::Parser;

use crate::cli::Cli;
use crate::core::formatter::{format_duration, format_error};
use crate::core::Outcome;

fn main() {
    let cli = Cli::parse();
    util::logging::init(cli.verbose);

    match cli.into_invocation().and_then(|invocation| crate::core::run(&invocation)) {
        Ok(Outcome::Converted(job)) => {
            if let Some(elapsed) = job.elapsed() {
                println!("Finished in {}", format_duration(elapsed));
            }
        }
        Ok(Outcome::Inspected) => {}
        Err(err) => {
            eprintln!("{}", format_error(&err));
            std::process::exit(1);
        }
    }
}
