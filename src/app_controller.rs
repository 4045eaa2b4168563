use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, LlmProvider};
use crate::database::{BookRecord, BookSummary, DatabaseConnection, Repository};
use crate::file_utils::{self, FileManager, PlainTextExtractor, TEXT_EXTENSION};
use crate::language_utils;
use crate::pipeline::{IngestionOutput, IngestionPipeline};
use crate::providers::anthropic::Anthropic;
use crate::providers::llm::{LlmServices, RetryPolicy};
use crate::providers::ollama::Ollama;
use crate::providers::prompts::PromptBuilder;
use crate::providers::{Provider, TextExtractor};

// @module: Application controller for novel ingestion

/// Options of one ingest run
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Book title, derived from the file name when absent
    pub title: Option<String>,
    /// Print scenes as JSON instead of storing them
    pub dry_run: bool,
    /// Ingest again even if the same text is already stored
    pub force: bool,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored under the given book id
    Stored { book_id: String, scene_count: usize },
    /// Printed only
    DryRun { scene_count: usize },
    /// Same text already stored under the given book id
    Skipped { book_id: String },
}

/// Main application controller for novel ingestion
pub struct Controller {
    // @field: App configuration
    config: Config,
}

fn progress_style(unit: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the ingestion pipeline for the configured provider, after checking it is reachable
    pub async fn build_pipeline(&self) -> Result<IngestionPipeline> {
        let llm = &self.config.llm;
        let timeout_secs = llm.get_timeout_secs();

        match llm.provider {
            LlmProvider::Ollama => {
                let provider = Ollama::new(&llm.get_endpoint(), llm.get_model(), timeout_secs);
                self.connect_pipeline(provider).await
            }
            LlmProvider::Anthropic => {
                let provider = Anthropic::new(llm.get_api_key(), llm.get_endpoint(), llm.get_model(), timeout_secs);
                self.connect_pipeline(provider).await
            }
        }
    }

    /// Test the connection to `provider`, then build the pipeline over it
    pub async fn connect_pipeline<P: Provider + 'static>(&self, provider: P) -> Result<IngestionPipeline> {
        provider.test_connection().await.with_context(|| {
            format!(
                "Cannot reach {} provider with model {}",
                self.config.llm.provider.display_name(),
                self.config.llm.get_model()
            )
        })?;
        info!("Connected to {} - {}", provider.name(), self.config.llm.get_model());
        self.pipeline_for(provider)
    }

    /// Build the ingestion pipeline over an explicit provider
    pub fn pipeline_for<P: Provider + 'static>(&self, provider: P) -> Result<IngestionPipeline> {
        let source_name = language_utils::get_language_name(&self.config.source_language)?;
        let target_name = language_utils::get_language_name(&self.config.target_language)?;
        let common = &self.config.llm.common;

        let prompts = PromptBuilder::new(&source_name, &target_name, common.temperature);
        let retry = RetryPolicy {
            retry_count: common.retry_count,
            backoff_ms: common.retry_backoff_ms,
        };
        let services = Arc::new(LlmServices::new(provider, prompts, retry));

        Ok(IngestionPipeline::new(
            services.clone(),
            services.clone(),
            services,
            self.config.segmentation.clone(),
        ))
    }

    /// Open the configured database, or `override_path` when given
    pub fn open_repository(&self, override_path: Option<&Path>) -> Result<Repository> {
        let path = override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.resolved_database_path());
        let db = DatabaseConnection::new(&path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Ok(Repository::new(db))
    }

    /// Ingest a `.txt` file or every `.txt` file under a directory
    pub async fn run(
        &self,
        input_path: &Path,
        pipeline: &IngestionPipeline,
        repository: Option<&Repository>,
        options: &IngestOptions,
    ) -> Result<Vec<IngestOutcome>> {
        if input_path.is_file() {
            let multi_progress = MultiProgress::new();
            let outcome = self
                .ingest_file(input_path, pipeline, repository, options, &multi_progress)
                .await?;
            return Ok(vec![outcome]);
        }
        if !input_path.is_dir() {
            return Err(anyhow::anyhow!("Input path does not exist: {:?}", input_path));
        }

        let files = FileManager::find_files(input_path, TEXT_EXTENSION)?;
        if files.is_empty() {
            return Err(anyhow::anyhow!("No .{} files found in directory: {:?}", TEXT_EXTENSION, input_path));
        }
        self.run_folder(&files, pipeline, repository, options).await
    }

    async fn run_folder(
        &self,
        files: &[PathBuf],
        pipeline: &IngestionPipeline,
        repository: Option<&Repository>,
        options: &IngestOptions,
    ) -> Result<Vec<IngestOutcome>> {
        let start_time = std::time::Instant::now();
        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(progress_style("files"));

        // A directory run titles each book after its file
        let options = IngestOptions {
            title: None,
            ..options.clone()
        };
        let mut outcomes = Vec::new();
        let mut error_count = 0;

        for file in files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.ingest_file(file, pipeline, repository, &options, &multi_progress).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to ingest {:?}: {:#}", file, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Processed {} files in {} ({} failed)",
            files.len(),
            Self::format_duration(start_time.elapsed()),
            error_count
        );

        Ok(outcomes)
    }

    /// Ingest one file
    pub async fn ingest_file(
        &self,
        path: &Path,
        pipeline: &IngestionPipeline,
        repository: Option<&Repository>,
        options: &IngestOptions,
        multi_progress: &MultiProgress,
    ) -> Result<IngestOutcome> {
        let start_time = std::time::Instant::now();
        let text = PlainTextExtractor.extract_text(path).await?;
        let source_hash = file_utils::content_hash(&text);

        let repository = if options.dry_run { None } else { repository };
        if let (Some(repository), false) = (repository, options.force) {
            if let Some(existing) = repository.find_book_by_hash(&source_hash).await? {
                warn!(
                    "Skipping {:?}, already ingested as '{}' (use --force to ingest again)",
                    path, existing.title
                );
                return Ok(IngestOutcome::Skipped { book_id: existing.id });
            }
        }

        info!(
            "Ingesting {:?} with {} - {}",
            path,
            self.config.llm.provider.display_name(),
            self.config.llm.get_model()
        );
        let output = self.segment_with_progress(pipeline, &text, multi_progress).await?;
        let scene_count = output.scenes.len();
        info!(
            "{} scenes from {} sentences in {}",
            scene_count,
            output.sentence_count,
            Self::format_duration(start_time.elapsed())
        );

        match repository {
            Some(repository) => {
                let title = options
                    .title
                    .clone()
                    .unwrap_or_else(|| FileManager::title_from_path(path));
                let book = BookRecord::new(
                    title,
                    language_utils::normalize_code(&self.config.source_language)?,
                    language_utils::normalize_code(&self.config.target_language)?,
                    source_hash,
                );
                repository.save_book(&book, &output.scenes).await?;
                info!("Stored '{}' as book {}", book.title, book.id);
                Ok(IngestOutcome::Stored { book_id: book.id, scene_count })
            }
            None => {
                let json = serde_json::to_string_pretty(&output.scenes)
                    .context("Failed to serialize scenes to JSON")?;
                println!("{}", json);
                Ok(IngestOutcome::DryRun { scene_count })
            }
        }
    }

    async fn segment_with_progress(
        &self,
        pipeline: &IngestionPipeline,
        text: &str,
        multi_progress: &MultiProgress,
    ) -> Result<IngestionOutput> {
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(progress_style("chunks"));
        progress_bar.set_message("Classifying scenes");

        let pb = progress_bar.clone();
        let result = pipeline
            .ingest_with_progress(text, &move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();
        Ok(result?)
    }

    /// List stored books
    pub async fn list_books(&self, repository: &Repository) -> Result<Vec<BookSummary>> {
        repository.list_books().await
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
