use std::process::ExitCode;

use relaypanel_server::config::{CliAction, ServerConfig, USAGE};
use relaypanel_server::logging::{LogConfig, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_args(std::env::args().skip(1)) {
        Ok(CliAction::Run(config)) => *config,
        Ok(CliAction::Help) => {
            eprint!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging(&LogConfig::default());

    match relaypanel_server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "relaypanel failed");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
