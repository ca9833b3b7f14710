use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use zoom_attendance_report::{
    cli::{Cli, Commands},
    config::{AppConfig, DEFAULT_LOG_FILE},
    handlers::{
        menu::run_menu,
        prompt::Prompter,
        scheduled::{resolve_request, run_check, run_scheduled, RunOverrides},
    },
    logging::init_logging,
    ReportResult,
};

async fn dispatch(cli: Cli, config: &AppConfig) -> ReportResult<()> {
    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(config, cli.format, &mut Prompter::stdio()).await,
        Commands::Run {
            meeting_id,
            range,
            email,
            no_email,
        } => {
            let overrides = RunOverrides {
                meeting_id,
                range,
                email,
                no_email,
            };
            let request = resolve_request(config, &overrides)?;
            run_scheduled(config, &request, cli.format).await.map(|_| ())
        }
        Commands::Check => {
            let request = resolve_request(config, &RunOverrides::default())?;
            run_check(config, &request, cli.format, &mut Prompter::stdio()).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before reading any setting
    dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let log_file = config
        .as_ref()
        .map(|config| config.log_file.clone())
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));
    let _guard = init_logging(&log_file);

    let result = match config {
        Ok(config) => dispatch(cli, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!("Run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = e.stage(), "{}", e);
            ExitCode::FAILURE
        }
    }
}
