mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, update, verify};
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);

    let result: anyhow::Result<ExitCode> = match commands.command {
        Commands::Update(args) => {
            print::header("updating steam hosts");
            update::update(&args.to_config()).await
        }
        Commands::Verify(args) => {
            print::header("verifying steam hosts");
            verify::verify(&args.hosts_path).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
