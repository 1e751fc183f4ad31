use std::process::ExitCode;

use mkchain::cli::run_cli;

fn main() -> ExitCode {
    run_cli()
}
