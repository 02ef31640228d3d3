//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::models::Direction;

/// Commands for the DOCX translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate .docx files on disk
    Docx {
        /// Input file or directory (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output directory (defaults next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation direction: ru-kk or kk-ru
        #[arg(short, long)]
        direction: String,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Enable debug mode
        #[arg(long)]
        debug: bool,
    },
}

/// Handle DOCX translation command
pub async fn handle_docx(
    file: PathBuf,
    output: Option<PathBuf>,
    direction: String,
    recursive: bool,
) -> anyhow::Result<()> {
    use crate::core::client::TranslationClient;
    use crate::core::config::TranslatorConfig;
    use crate::processors::docx::DocxProcessor;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::info;

    let start_time = Instant::now();

    let direction: Direction = direction.parse()?;

    // Determine output directory
    let output = output.unwrap_or_else(|| {
        if file.is_dir() {
            file.join("translated")
        } else {
            file.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        }
    });

    info!("Starting DOCX translation");
    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Direction: {}", direction);
    info!("Recursive: {}", recursive);

    // Create processor
    let config = TranslatorConfig::from_env()?;
    let max_table_depth = config.max_table_depth;
    let translator = TranslationClient::new(config)?;
    let processor = DocxProcessor::new(translator).with_max_table_depth(max_table_depth);

    // Find files
    let files = if file.is_dir() {
        if recursive {
            processor.find_docx_files_recursive(&file)?
        } else {
            processor.find_docx_files(&file)?
        }
    } else {
        vec![file]
    };

    if files.is_empty() {
        anyhow::bail!("No .docx files found");
    }

    tokio::fs::create_dir_all(&output).await?;

    // Create progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap()
        .progress_chars("=>-"));

    // Process files
    let mut processed = 0;
    let mut failed = 0;

    for file_path in files {
        pb.set_message(format!("Processing: {}", file_path.display()));

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.docx".to_string());
        let target = output.join(format!("translated_{}", file_name));

        match processor.translate_file(&file_path, &target, direction).await {
            Ok(_) => {
                processed += 1;
                pb.inc(1);
            }
            Err(e) => {
                failed += 1;
                pb.set_message(format!("Failed: {} - {}", file_path.display(), e));
                eprintln!("Error processing {}: {}", file_path.display(), e);
            }
        }
    }

    pb.finish_with_message("Completed");

    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} failed in {:?}",
        processed, failed, duration
    );

    println!("\n✅ Translation completed!");
    println!("   Processed: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle server command
pub async fn handle_server(host: String, port: u16, debug: bool) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    if debug {
        std::env::set_var("RUST_LOG", "debug");
    }

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port).await?;

    Ok(())
}
