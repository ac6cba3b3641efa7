use clap::Parser;
use std::process;
use wafer_lang::cli::{Cli, CliHandler};

fn main() {
    let cli = Cli::parse();
    let handler = CliHandler::new();

    if let Err(e) = handler.handle(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
