//! Entry point for the dupelint CLI.

use clap::Parser;
use dupelint::{cli::Cli, error::ExitCode, logging::init_logging};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match dupelint::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;
            eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
