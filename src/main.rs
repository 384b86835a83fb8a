use clap::Parser;
use oaslint::cli::{run_cli, Cli, Outcome};
use oaslint::logging::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let _guard = init_logging(&LogConfig::from_env())?;

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    match run_cli(&cli, &mut stdout.lock())? {
        Outcome::Clean => Ok(ExitCode::SUCCESS),
        Outcome::Failed => Ok(ExitCode::FAILURE),
    }
}
