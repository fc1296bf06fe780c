use chunkzip_core::logging;
use clap::Parser;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Fall back to stderr if the state dir is unusable.
    if logging::init_logging(cli.command.log_role()).is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run().await {
        eprintln!("chunkzip error: {:#}", err);
        std::process::exit(1);
    }
}
