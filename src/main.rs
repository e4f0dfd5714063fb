use clap::Parser;
use hotel_directory::utils::{logger, validation::Validate};
use hotel_directory::{CliConfig, DirectoryEngine, DirectoryPipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting hotel-directory CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DirectoryPipeline::new(storage, config);
    let engine = DirectoryEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Directory report written");
            println!("✅ Directory report written to {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Directory build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
