//! Main entry point for the DOCX translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docx_translator::cli::commands::{self, Commands};

/// DOCX translation service between Russian and Kazakh
#[derive(Parser, Debug)]
#[command(name = "docx-translator", version, about, long_about = None)]
struct Args {
    /// Translation API base URL (overrides TRANSLATE_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Override config with CLI args if provided
    if let Some(api_base) = args.api_base {
        std::env::set_var("TRANSLATE_API_BASE", api_base);
    }

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    // Initialize logging
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docx_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    match args.command {
        Some(Commands::Docx {
            file,
            output,
            direction,
            recursive,
        }) => {
            commands::handle_docx(file, output, direction, recursive).await?;
        }
        Some(Commands::Server { host, port, debug }) => {
            commands::handle_server(host, port, debug).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
