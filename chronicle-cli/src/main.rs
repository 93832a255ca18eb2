//! Chronicle CLI - Command-line interface for Chronicle
//!
//! Runs tiered historical research from the terminal and manages the settings file

use anyhow::{bail, Context};
use chronicle_core::{
    init_logging, CitationStyle, LoggingConfig, OutputFormat, ResearchDepth, ResearchQuery,
    Settings, DEFAULT_CONFIG_FILE,
};
use chronicle_research::{render, ResearchServices};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(about = "Tiered historical research with citations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a historical question
    Research {
        /// Question to research
        query: String,

        /// Research depth (basic, auto, deep)
        #[arg(short, long, default_value = "auto")]
        depth: String,

        /// Output format (json, markdown, structured); defaults to the configured format
        #[arg(short, long)]
        format: Option<String>,

        /// Citation style (mla, apa); defaults to the configured style
        #[arg(long)]
        citation_style: Option<String>,

        /// Maximum number of sources (1-50)
        #[arg(long)]
        max_sources: Option<usize>,
    },

    /// Show which research tiers and LLM are configured
    Health,

    /// Manage the settings file
    Config {
        /// Write a default settings file
        #[arg(long)]
        init: bool,

        /// Show the effective settings with secrets masked
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::from_settings(&settings)
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Starting Chronicle CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Research {
            query,
            depth,
            format,
            citation_style,
            max_sources,
        } => {
            handle_research(
                &settings,
                query,
                &depth,
                format.as_deref(),
                citation_style.as_deref(),
                max_sources,
            )
            .await?;
        }
        Commands::Health => handle_health(&settings)?,
        Commands::Config { init, show } => handle_config(&settings, cli.config.as_deref(), init, show)?,
    }

    Ok(())
}

async fn handle_research(
    settings: &Settings,
    query: String,
    depth: &str,
    format: Option<&str>,
    citation_style: Option<&str>,
    max_sources: Option<usize>,
) -> anyhow::Result<()> {
    let depth: ResearchDepth = depth.parse()?;
    let format = match format {
        Some(format) => format.parse::<OutputFormat>()?,
        None => settings.default_output_format,
    };

    let mut query = ResearchQuery::new(query).with_depth(depth);
    query.max_sources = max_sources;
    query.validate()?;

    let services =
        ResearchServices::from_settings(settings).context("Failed to build research services")?;
    if depth == ResearchDepth::Deep && !services.tier2_available() {
        eprintln!("Tier 2 is not configured; running basic research instead.");
    }

    let orchestrator = &services.orchestrator;
    let mut citation = orchestrator.config().citation;
    if let Some(style) = citation_style {
        citation = citation.with_style(CitationStyle::parse(style));
    }

    info!("Researching '{}' (depth {})", query.query, query.depth);
    let result = orchestrator.research_with_options(&query, citation).await;

    println!("{}", render(&result, format)?);
    Ok(())
}

fn handle_health(settings: &Settings) -> anyhow::Result<()> {
    let services =
        ResearchServices::from_settings(settings).context("Failed to build research services")?;

    println!("Chronicle v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Tier 1 ({}): {}",
        services.orchestrator.tier1_name(),
        availability(services.tier1_available)
    );
    println!("  Tier 2 (tavily): {}", availability(services.tier2_available()));
    println!("  LLM: {} / {}", services.llm_provider, services.llm_model);
    println!(
        "  Auto escalation: {}",
        if settings.enable_auto_escalation { "on" } else { "off" }
    );
    Ok(())
}

fn availability(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "unavailable"
    }
}

fn handle_config(
    settings: &Settings,
    path: Option<&Path>,
    init: bool,
    show: bool,
) -> anyhow::Result<()> {
    if init {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        init_config_file(path)?;
        println!("Configuration initialized at: {}", path.display());
        println!("Edit the file to add your API keys, or set them in the environment.");
    }

    if show || !init {
        let masked = masked_settings(settings);
        let rendered =
            toml::to_string_pretty(&masked).context("Failed to render settings as TOML")?;
        println!("{}", rendered);
    }

    Ok(())
}

fn init_config_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!(
            "{} already exists; remove it first to regenerate defaults",
            path.display()
        );
    }
    Settings::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Copy of the settings with every API key replaced by a placeholder
fn masked_settings(settings: &Settings) -> Settings {
    fn mask(value: &Option<String>) -> Option<String> {
        value.as_ref().map(|_| "********".to_string())
    }

    let mut masked = settings.clone();
    masked.openai_api_key = mask(&settings.openai_api_key);
    masked.anthropic_api_key = mask(&settings.anthropic_api_key);
    masked.google_api_key = mask(&settings.google_api_key);
    masked.openrouter_api_key = mask(&settings.openrouter_api_key);
    masked.brave_api_key = mask(&settings.brave_api_key);
    masked.tavily_api_key = mask(&settings.tavily_api_key);
    masked
}
