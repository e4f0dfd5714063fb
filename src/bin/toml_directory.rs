use anyhow::Context;
use clap::Parser;
use hotel_directory::core::source::SourceLocation;
use hotel_directory::core::ConfigProvider;
use hotel_directory::utils::{logger, validation::Validate};
use hotel_directory::{DirectoryEngine, DirectoryPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-directory")]
#[command(about = "Build a hotel directory report from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "directory.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger_with_level(args.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting TOML-based directory build");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
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
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Directory: {}", config.directory.name);
    if let Some(description) = &config.directory.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("🏙️  Cities: {}", config.cities_source());
    tracing::info!("🏨 Hotels: {}", config.hotels_source());
    tracing::info!(
        "💾 Output: {}/{} ({})",
        config.output_path(),
        config.archive_name(),
        config.output_formats().join(", ")
    );
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let cities = SourceLocation::parse(config.cities_source())?;
    let hotels = SourceLocation::parse(config.hotels_source())?;

    println!("Would load cities from: {}", cities);
    println!("Would load hotels from: {}", hotels);
    println!(
        "Would write {}/{} containing: {}, summary.json",
        config.output_path(),
        config.archive_name(),
        config
            .output_formats()
            .iter()
            .map(|f| format!("hotels.{}", f))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
