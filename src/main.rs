use calcheck::cli::commands::{Cli, Commands};
use calcheck::cli::handlers;
use calcheck::io::log::init_logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    // The demo owns the terminal, so it only logs when given a file
    let interactive = matches!(cli.command, None | Some(Commands::Demo(_)));
    let logging = match (interactive, cli.log_file.as_deref()) {
        (true, None) => Ok(()),
        (_, log_file) => init_logging(log_file),
    };
    if let Err(e) = logging {
        eprintln!("error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
