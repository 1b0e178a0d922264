use std::env;
use std::io;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use jumpplan::{execute, parse_args, usage_text, CliCommand, RunStatus};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_args(&args) {
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Run(options)) => options,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            return ExitCode::from(1);
        }
    };

    init_tracing();
    let stop = AtomicBool::new(false);
    match execute(&options, &stop, &mut io::stdout()) {
        Ok(RunStatus::Succeeded) => ExitCode::SUCCESS,
        Ok(RunStatus::Failed) => ExitCode::from(2),
        Err(message) => {
            error!(error = %message, "run_aborted");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
