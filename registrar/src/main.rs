//! llm-consul Entry Point

use clap::Parser;
use llm_consul::cli::{plan, serve, Cli, Commands};
use llm_consul::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Some(Commands::Plan(args)) => plan::execute(&args),
        Some(Commands::Serve(args)) => serve::execute(&args).await,
        None => {
            // No subcommand - default to serve
            serve::execute(&serve::ServeArgs::from_env()).await
        }
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
