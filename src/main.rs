use clap::Parser;
use renametree::cli::{Prompter, RunArgs, run_cli};
use renametree::output::OutputFormatter;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("renametree - rename a templated solution");

    let args = RunArgs::parse();
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match run_cli(&args, &mut prompter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
