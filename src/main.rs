use finrag::acquisition::{DocumentFetcher, HttpFetcher};
use finrag::cli::{Cli, Commands, ConfigAction};
use finrag::config::Config;
use finrag::embedding::{EmbeddingProvider, FastEmbedProvider};
use finrag::error::{RagError, Result};
use finrag::server::{self, AppState};
use finrag::service::RagService;
use finrag::splitter::Splitter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Serve { bind } => {
            let config = load_config(cli.config, cli.profile)?;
            cmd_serve(config, bind)?;
        }
        Commands::Ask {
            urls,
            question,
            top_k,
            offline,
            json,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            cmd_ask(config, &urls, &question, top_k, offline, json)?;
        }
        Commands::Split {
            file,
            chunk_size,
            overlap,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            cmd_split(&config, &file, chunk_size, overlap)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "finrag=debug" } else { "finrag=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(config: &Config) -> Result<RagService> {
    tracing::info!("Loading embedding model {}", config.embedding.model);
    let provider = FastEmbedProvider::new(&config.embedding.model)?
        .with_batch_size(config.embedding.batch_size);
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(provider);

    RagService::from_config(config, provider)
}

fn build_fetcher(config: &Config) -> Result<HttpFetcher> {
    Ok(
        HttpFetcher::new(config.fetch.timeout(), config.fetch.user_agent.clone())?
            .with_min_paragraph_chars(config.fetch.min_paragraph_chars),
    )
}

fn cmd_serve(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    // Model loading and the blocking HTTP client are set up before the runtime starts
    let service = Arc::new(build_service(&config)?);
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(build_fetcher(&config)?);
    let state = AppState::new(service, fetcher);

    let rt = tokio::runtime::Runtime::new().map_err(|e| RagError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    rt.block_on(server::serve(&bind, state.clone()))
}

fn cmd_ask(
    mut config: Config,
    urls: &[String],
    question: &str,
    top_k: Option<usize>,
    offline: bool,
    json: bool,
) -> Result<()> {
    if offline {
        config.llm.enabled = false;
    }

    let service = build_service(&config)?;
    let fetcher = build_fetcher(&config)?;

    let count = service.ingest_urls(&fetcher, urls)?;
    if count == 0 {
        println!("Ingestion produced no passages (check URLs).");
        return Ok(());
    }
    tracing::info!("Indexed {} passages", count);

    let response = service.query(question, top_k)?;

    if json {
        let out = serde_json::to_string_pretty(&response).map_err(|e| RagError::Json {
            source: e,
            context: "Failed to serialize response".to_string(),
        })?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", response.answer);
    println!("\nEvidence:");
    for (i, evidence) in response.evidence.iter().enumerate() {
        println!(
            "  [{}] {:.4}  {}  ({})",
            i + 1,
            evidence.score,
            evidence.url,
            &evidence.id[..12.min(evidence.id.len())]
        );
    }

    Ok(())
}

fn cmd_split(
    config: &Config,
    file: &Path,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(|e| RagError::Io {
        source: e,
        context: format!("Failed to read {:?}", file),
    })?;

    let splitter = Splitter::new(
        chunk_size.unwrap_or(config.splitter.chunk_size),
        overlap.unwrap_or(config.splitter.overlap),
        config.splitter.min_passage_chars,
    )?;
    let passages = splitter.split(&text);

    for (i, passage) in passages.iter().enumerate() {
        println!("--- passage {} ({} chars) ---", i, passage.chars().count());
        println!("{}\n", passage);
    }
    println!("{} passages", passages.len());

    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| RagError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| RagError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'finrag config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        finrag::config::ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    if let Some(profile) = profile {
        Config::load_with_profile(&path, &profile)
    } else {
        Config::load(&path)
    }
}
