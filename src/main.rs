mod cli;
mod error;
mod filter;
mod fmt;
mod importer;
mod logging;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod settings;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(e) = cli::run::run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
