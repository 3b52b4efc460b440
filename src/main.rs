use anyhow::{Context, Result};
use bing_image_dataset::client::BingSearchClient;
use bing_image_dataset::config::{find_config_file, get_config, load_config, Config};
use bing_image_dataset::export::DatasetExporter;
use bing_image_dataset::models::{InsightsOptions, SafeSearchMode, SearchQuery, TermLabelPair};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bing Image Dataset - Search Bing and export image results as a labeled dataset
#[derive(Parser, Debug)]
#[command(name = "bing-image-dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Bing and export image results as a labeled dataset", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every outbound search request
    #[arg(long, global = true)]
    log_requests: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Safe search level
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SafeSearch {
    Strict,
    Moderate,
    Off,
}

impl From<SafeSearch> for SafeSearchMode {
    fn from(value: SafeSearch) -> Self {
        match value {
            SafeSearch::Strict => SafeSearchMode::Strict,
            SafeSearch::Moderate => SafeSearchMode::Moderate,
            SafeSearch::Off => SafeSearchMode::Off,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single search and print the result page as JSON
    #[command(alias = "s", subcommand)]
    Search(SearchKind),

    /// Upload an image to visual search and print the raw response
    Insights {
        /// Image file to upload
        file: PathBuf,

        /// Restrict similar-image results to one site
        #[arg(long)]
        site: Option<String>,

        /// Image URL sent alongside the upload
        #[arg(long)]
        image_url: Option<String>,

        /// Safe search level (default: from config)
        #[arg(long, value_enum)]
        safe_search: Option<SafeSearch>,
    },

    /// Download image results as a labeled dataset
    #[command(alias = "e", subcommand)]
    Export(ExportKind),

    /// Configuration file helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum SearchKind {
    /// Search for images
    Images(SearchArgs),

    /// Search for videos
    Videos(SearchArgs),
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Search term
    term: String,

    /// Results per page
    #[arg(long, short, default_value_t = 10)]
    count: u32,

    /// Results to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Safe search level (default: from config)
    #[arg(long, value_enum)]
    safe_search: Option<SafeSearch>,
}

#[derive(Subcommand, Debug)]
enum ExportKind {
    /// Write images to <BASE>/Images/<label>/
    Disk {
        /// Base folder (default: from config)
        base: Option<PathBuf>,

        #[command(flatten)]
        terms: ExportArgs,

        /// Replace files that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Write images into a zip archive
    Zip {
        /// Output archive path
        output: PathBuf,

        #[command(flatten)]
        terms: ExportArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Search term, optionally with a label: "tabby cat=cat" (repeatable)
    #[arg(long = "term", short, required = true)]
    terms: Vec<TermLabelPair>,

    /// Safe search level (default: from config)
    #[arg(long, value_enum)]
    safe_search: Option<SafeSearch>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Destination (default: ./bing-image-dataset.toml)
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    // Load configuration from file if specified or found in default locations
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()
    };
    config.search.log_requests |= cli.log_requests;

    match cli.command {
        Commands::Search(kind) => run_search(&config, kind).await,
        Commands::Insights {
            file,
            site,
            image_url,
            safe_search,
        } => {
            let client = BingSearchClient::from_config(&config.search)?;
            let image = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string());

            let mut options = InsightsOptions::new();
            options.site = site;
            options.image_url = image_url;

            let safe_search = safe_search.map_or(config.search.safe_search, Into::into);
            let body = client
                .get_image_insights(image, &filename, safe_search, &options)
                .await?;
            println!("{}", body);
            Ok(())
        }
        Commands::Export(kind) => run_export(&config, kind).await,
        Commands::Config(ConfigCommand::Init { path, force }) => {
            let path = path.unwrap_or_else(|| PathBuf::from("bing-image-dataset.toml"));
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", path.display());
            }
            std::fs::write(&path, Config::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bing_image_dataset={}", env_filter)),
    );

    // Logs go to stderr so search output on stdout stays machine-readable
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run_search(config: &Config, kind: SearchKind) -> Result<()> {
    let client = BingSearchClient::from_config(&config.search)?;

    let (args, videos) = match kind {
        SearchKind::Images(args) => (args, false),
        SearchKind::Videos(args) => (args, true),
    };
    let query = SearchQuery::new(args.term)
        .safe_search(args.safe_search.map_or(config.search.safe_search, Into::into))
        .count(args.count)
        .offset(args.offset);

    let json = if videos {
        serde_json::to_string_pretty(&client.search_videos(&query).await?)?
    } else {
        serde_json::to_string_pretty(&client.search_images(&query).await?)?
    };
    println!("{}", json);
    Ok(())
}

async fn run_export(config: &Config, kind: ExportKind) -> Result<()> {
    let client = BingSearchClient::from_config(&config.search)?;
    let fetcher = Arc::new(client.http().clone());
    let exporter = DatasetExporter::new(Arc::new(client), fetcher);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping export");
            on_ctrl_c.cancel();
        }
    });

    match kind {
        ExportKind::Disk {
            base,
            terms,
            overwrite,
        } => {
            let base = base.unwrap_or_else(|| config.export.base_folder.clone());
            std::fs::create_dir_all(&base)
                .with_context(|| format!("Failed to create {}", base.display()))?;

            let safe_search = terms.safe_search.map_or(config.search.safe_search, Into::into);
            let summary = exporter
                .export_to_disk(
                    &terms.terms,
                    &base,
                    safe_search,
                    overwrite || config.export.overwrite,
                    &cancel,
                )
                .await?;
            println!(
                "Stored {} images ({} skipped, {} failed) under {}",
                summary.stored,
                summary.skipped,
                summary.failed,
                base.display()
            );
        }
        ExportKind::Zip { output, terms } => {
            let safe_search = terms.safe_search.map_or(config.search.safe_search, Into::into);
            let archive = exporter
                .export_to_zip(&terms.terms, safe_search, &cancel)
                .await?;
            tokio::fs::write(&output, archive.into_inner())
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}
