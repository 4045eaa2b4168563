// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use novelscene::app_config::{self, Config, LlmProvider};
use novelscene::app_controller::{Controller, IngestOptions, IngestOutcome};

/// Environment variable holding the provider API key
const API_KEY_ENV: &str = "NOVELSCENE_API_KEY";

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLlmProvider {
    Ollama,
    Anthropic,
}

impl From<CliLlmProvider> for LlmProvider {
    fn from(cli_provider: CliLlmProvider) -> Self {
        match cli_provider {
            CliLlmProvider::Ollama => LlmProvider::Ollama,
            CliLlmProvider::Anthropic => LlmProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a novel into scenes and store them (default command)
    Ingest(IngestArgs),

    /// List stored books
    Books {
        /// SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for novelscene
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// Plain-text novel or directory of .txt files
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Book title (defaults to the file name)
    #[arg(long)]
    title: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Language model provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliLlmProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'fr', 'de')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Print scenes as JSON instead of storing them
    #[arg(long)]
    dry_run: bool,

    /// Ingest again even if the same text is already stored
    #[arg(short, long)]
    force: bool,
}

/// novelscene - split translated novels into scenes
///
/// Slices a novel into sentences, translates them, lets a language model
/// propose scene boundaries and stores the reconciled scenes with vocabulary
/// and comprehension questions.
#[derive(Parser, Debug)]
#[command(name = "novelscene")]
#[command(version)]
#[command(about = "Split novels into scenes with translations and exercises")]
#[command(long_about = "novelscene splits plain-text novels into scenes and generates exercises with AI providers.

EXAMPLES:
    novelscene ingest roman.txt                       # Ingest using default config
    novelscene ingest -p anthropic roman.txt          # Use a specific provider
    novelscene ingest -s de -t en --title Faust f.txt # German novel, English translation
    novelscene ingest --dry-run roman.txt             # Print scenes as JSON
    novelscene ingest /books/                         # Ingest every .txt file in a directory
    novelscene books                                  # List stored books
    novelscene completions bash > novelscene.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically. The API key may also be
    given through the NOVELSCENE_API_KEY environment variable.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set below
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "novelscene", &mut std::io::stdout());
            Ok(())
        }
        Commands::Books { database, config_path } => run_books(&config_path, database.as_deref()).await,
        Commands::Ingest(args) => run_ingest(args).await,
    }
}

/// Load the config file, creating a default one when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config
        .save_to_file(config_path)
        .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, options: &IngestArgs) {
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.llm.active_provider_config_mut().model = model.clone();
    }

    if let Ok(api_key) = std::env::var(API_KEY_ENV) {
        if !api_key.trim().is_empty() {
            config.llm.active_provider_config_mut().api_key = api_key.trim().to_string();
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(database) = &options.database {
        config.database_path = Some(database.clone());
    }
}

async fn run_ingest(options: IngestArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    if !options.input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    let controller = Controller::with_config(config)?;
    let pipeline = controller.build_pipeline().await?;
    let repository = if options.dry_run {
        None
    } else {
        Some(controller.open_repository(None)?)
    };

    let ingest_options = IngestOptions {
        title: options.title.clone(),
        dry_run: options.dry_run,
        force: options.force,
    };
    let outcomes = controller
        .run(&options.input_path, &pipeline, repository.as_ref(), &ingest_options)
        .await?;

    let stored = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, IngestOutcome::Stored { .. }))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, IngestOutcome::Skipped { .. }))
        .count();
    if !options.dry_run {
        info!("Done: {} stored, {} skipped", stored, skipped);
    }

    Ok(())
}

async fn run_books(config_path: &str, database: Option<&Path>) -> Result<()> {
    let config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let repository = controller.open_repository(database)?;
    let books = controller.list_books(&repository).await?;

    if books.is_empty() {
        println!("No books stored yet.");
        return Ok(());
    }

    for summary in books {
        println!(
            "{}  {}  {}->{}  {} scenes  {}",
            summary.book.id,
            summary.book.title,
            summary.book.original_language,
            summary.book.target_language,
            summary.scene_count,
            summary.book.created_at
        );
    }

    Ok(())
}
